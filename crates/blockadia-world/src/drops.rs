//! Cargo dropped on the ground when a carrying villager is redirected.
//!
//! A load is settled against its node before it touches the ground, so a
//! pile owes nothing to any node and same-kind piles merge freely.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use blockadia_types::{Cargo, DropId, TilePos};

/// A pile of resources waiting to be picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedResource {
    /// Drop identifier.
    pub id: DropId,
    /// Tile it lies on.
    pub tile: TilePos,
    /// What lies there.
    pub cargo: Cargo,
}

impl DroppedResource {
    /// Whether a new load can be merged into this pile.
    pub fn accepts(&self, cargo: &Cargo) -> bool {
        self.cargo.kind == cargo.kind
    }
}

/// All dropped resources, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct DropRegistry {
    drops: BTreeMap<DropId, DroppedResource>,
}

impl DropRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            drops: BTreeMap::new(),
        }
    }

    /// Insert or replace a drop.
    pub fn insert(&mut self, drop: DroppedResource) {
        self.drops.insert(drop.id, drop);
    }

    /// Remove a drop.
    pub fn remove(&mut self, id: DropId) -> Option<DroppedResource> {
        self.drops.remove(&id)
    }

    /// Look up a drop.
    pub fn get(&self, id: DropId) -> Option<&DroppedResource> {
        self.drops.get(&id)
    }

    /// Look up a drop mutably.
    pub fn get_mut(&mut self, id: DropId) -> Option<&mut DroppedResource> {
        self.drops.get_mut(&id)
    }

    /// Number of drops.
    pub fn len(&self) -> usize {
        self.drops.len()
    }

    /// Whether there are no drops.
    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    /// Iterate in id order.
    pub fn iter(&self) -> impl Iterator<Item = &DroppedResource> {
        self.drops.values()
    }

    /// Sum of all dropped amounts.
    pub fn total_amount(&self) -> u64 {
        self.drops
            .values()
            .fold(0_u64, |acc, d| acc.saturating_add(u64::from(d.cargo.amount)))
    }
}
