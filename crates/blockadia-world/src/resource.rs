//! Depletable resource nodes.
//!
//! A villager finishing its dwell at a node *reserves* up to one cargo load
//! from it. The node's quantity only drops when that cargo is delivered at
//! the village, or when a redirected villager drops it on the ground, so the
//! inspector keeps showing what is physically left while two villagers can
//! never carry away the same units. A node whose quantity reaches zero on
//! settlement is removed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use blockadia_types::{NodeId, NodeKind, TilePos};

/// A tree or mineral deposit on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Node identifier.
    pub id: NodeId,
    /// Tree, stone, gold or metal.
    pub kind: NodeKind,
    /// Tile it stands on.
    pub tile: TilePos,
    /// Units left in the node.
    pub quantity: u32,
    /// Units already loaded onto villagers but not yet delivered.
    pub reserved: u32,
}

/// Result of settling a delivery against a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depletion {
    /// The node still holds this many units.
    Remaining(u32),
    /// The node is empty and must be removed.
    Exhausted,
}

impl ResourceNode {
    /// Create a node with nothing reserved.
    pub const fn new(id: NodeId, kind: NodeKind, tile: TilePos, quantity: u32) -> Self {
        Self {
            id,
            kind,
            tile,
            quantity,
            reserved: 0,
        }
    }

    /// Units not yet claimed by any villager.
    pub const fn available(&self) -> u32 {
        self.quantity.saturating_sub(self.reserved)
    }

    /// Claim up to `requested` units for a cargo load. Returns what was
    /// actually claimed, which is zero when everything is spoken for.
    pub fn reserve(&mut self, requested: u32) -> u32 {
        let taken = requested.min(self.available());
        self.reserved = self.reserved.saturating_add(taken);
        taken
    }

    /// Settle a delivered load: drop the reservation and the quantity.
    pub fn settle(&mut self, delivered: u32) -> Depletion {
        self.reserved = self.reserved.saturating_sub(delivered);
        self.quantity = self.quantity.saturating_sub(delivered);
        if self.quantity == 0 {
            Depletion::Exhausted
        } else {
            Depletion::Remaining(self.quantity)
        }
    }
}

/// All live resource nodes, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: BTreeMap<NodeId, ResourceNode>,
}

impl NodeRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Insert or replace a node.
    pub fn insert(&mut self, node: ResourceNode) {
        self.nodes.insert(node.id, node);
    }

    /// Remove a node.
    pub fn remove(&mut self, id: NodeId) -> Option<ResourceNode> {
        self.nodes.remove(&id)
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&ResourceNode> {
        self.nodes.get(&id)
    }

    /// Look up a node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ResourceNode> {
        self.nodes.get_mut(&id)
    }

    /// Whether the node still exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.values()
    }

    /// Count nodes of one kind.
    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes.values().filter(|n| n.kind == kind).count()
    }

    /// The node of `kind` nearest to `from` by Chebyshev distance, ties
    /// broken by id.
    pub fn nearest(&self, kind: NodeKind, from: TilePos) -> Option<&ResourceNode> {
        self.nodes
            .values()
            .filter(|n| n.kind == kind)
            .min_by_key(|n| (n.tile.chebyshev(from), n.id))
    }
}
