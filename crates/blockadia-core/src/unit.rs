//! Units and their task states.
//!
//! A [`Unit`] is a shared base (id, pixel position, optional movement) plus a
//! kind-specific [`UnitBody`]. Every timer a unit owns lives inside its task:
//! the gather countdown is a field of [`VillagerTask::Gathering`] and the
//! travel interpolation is the `movement` field. Replacing the task or the
//! movement therefore cancels the old timer; nothing can fire for a state
//! the unit has already left.

use blockadia_types::{
    Cargo, DropId, NodeId, TilePos, UnitActivity, UnitId, UnitKind, UnitSelection, WorldPoint,
};
use blockadia_world::Grid;

use crate::movement::Movement;

/// What a walking villager will do on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkGoal {
    /// Stop and idle.
    Tile,
    /// Start gathering from this node.
    Gather(NodeId),
    /// Pick up this drop.
    Pickup(DropId),
}

/// Villager task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VillagerTask {
    /// No task.
    Idle,
    /// Travelling toward a goal.
    Walking(WalkGoal),
    /// Working a node; the load is ready when `remaining_ms` reaches zero.
    Gathering {
        /// The node being worked.
        node: NodeId,
        /// Dwell time left.
        remaining_ms: u64,
    },
    /// Carrying a load to the village drop point.
    Returning {
        /// The load.
        cargo: Cargo,
        /// Node the load was reserved from.
        source: Option<NodeId>,
    },
}

/// Soldier task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoldierTask {
    /// Standing.
    Idle,
    /// Travelling to a tile.
    Walking,
    /// Reserved for combat; never entered.
    Attacking,
}

/// Kind-specific unit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitBody {
    /// A villager and its task.
    Villager(VillagerTask),
    /// A soldier and its task.
    Soldier(SoldierTask),
}

/// A roaming unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Unit identifier.
    pub id: UnitId,
    /// Current pixel position.
    pub position: WorldPoint,
    /// In-flight movement, if any.
    pub movement: Option<Movement>,
    /// Task state.
    pub body: UnitBody,
}

impl Unit {
    /// An idle unit standing at `position`.
    pub const fn new(id: UnitId, kind: UnitKind, position: WorldPoint) -> Self {
        let body = match kind {
            UnitKind::Villager => UnitBody::Villager(VillagerTask::Idle),
            UnitKind::Soldier => UnitBody::Soldier(SoldierTask::Idle),
        };
        Self {
            id,
            position,
            movement: None,
            body,
        }
    }

    /// Villager or soldier.
    pub const fn kind(&self) -> UnitKind {
        match self.body {
            UnitBody::Villager(_) => UnitKind::Villager,
            UnitBody::Soldier(_) => UnitKind::Soldier,
        }
    }

    /// Whether this unit is a villager.
    pub const fn is_villager(&self) -> bool {
        matches!(self.body, UnitBody::Villager(_))
    }

    /// Activity reported to the UI.
    pub const fn activity(&self) -> UnitActivity {
        match self.body {
            UnitBody::Villager(VillagerTask::Idle) | UnitBody::Soldier(SoldierTask::Idle) => {
                UnitActivity::Idle
            }
            UnitBody::Villager(VillagerTask::Walking(_))
            | UnitBody::Soldier(SoldierTask::Walking) => UnitActivity::Walking,
            UnitBody::Villager(VillagerTask::Gathering { .. }) => UnitActivity::Gathering,
            UnitBody::Villager(VillagerTask::Returning { .. }) => UnitActivity::Returning,
            UnitBody::Soldier(SoldierTask::Attacking) => UnitActivity::Attacking,
        }
    }

    /// The load being carried, if any.
    pub const fn cargo(&self) -> Option<Cargo> {
        match self.body {
            UnitBody::Villager(VillagerTask::Returning { cargo, .. }) => Some(cargo),
            _ => None,
        }
    }

    /// Whether this is a villager with no task and no movement.
    pub const fn is_idle_villager(&self) -> bool {
        matches!(self.body, UnitBody::Villager(VillagerTask::Idle)) && self.movement.is_none()
    }

    /// The node this villager is working or heading to.
    pub const fn target_node(&self) -> Option<NodeId> {
        match self.body {
            UnitBody::Villager(
                VillagerTask::Walking(WalkGoal::Gather(node)) | VillagerTask::Gathering { node, .. },
            ) => Some(node),
            _ => None,
        }
    }

    /// Tile under the unit.
    pub fn tile(&self, grid: &Grid) -> TilePos {
        grid.tile_at(self.position)
    }

    /// Inspector payload.
    pub fn selection(&self, grid: &Grid) -> UnitSelection {
        UnitSelection {
            id: self.id,
            kind: self.kind(),
            tile: self.tile(grid),
            activity: self.activity(),
            cargo: self.cargo(),
        }
    }
}

#[cfg(test)]
mod tests {
    use blockadia_types::ResourceKind;

    use super::*;

    fn villager(task: VillagerTask) -> Unit {
        let mut unit = Unit::new(
            UnitId::from_random_bytes([1; 16]),
            UnitKind::Villager,
            WorldPoint::new(16.0, 16.0),
        );
        unit.body = UnitBody::Villager(task);
        unit
    }

    #[test]
    fn activity_follows_task() {
        let node = NodeId::from_random_bytes([2; 16]);
        assert_eq!(villager(VillagerTask::Idle).activity(), UnitActivity::Idle);
        assert_eq!(
            villager(VillagerTask::Gathering {
                node,
                remaining_ms: 10
            })
            .activity(),
            UnitActivity::Gathering
        );
        let returning = villager(VillagerTask::Returning {
            cargo: Cargo::new(ResourceKind::Wood, 10),
            source: Some(node),
        });
        assert_eq!(returning.activity(), UnitActivity::Returning);
        assert_eq!(returning.cargo().map(|c| c.amount), Some(10));
    }

    #[test]
    fn soldier_has_no_cargo() {
        let soldier = Unit::new(
            UnitId::from_random_bytes([3; 16]),
            UnitKind::Soldier,
            WorldPoint::new(0.0, 0.0),
        );
        assert_eq!(soldier.kind(), UnitKind::Soldier);
        assert_eq!(soldier.cargo(), None);
        assert!(!soldier.is_idle_villager());
    }

    #[test]
    fn target_node_for_walking_and_gathering() {
        let node = NodeId::from_random_bytes([2; 16]);
        assert_eq!(
            villager(VillagerTask::Walking(WalkGoal::Gather(node))).target_node(),
            Some(node)
        );
        assert_eq!(villager(VillagerTask::Walking(WalkGoal::Tile)).target_node(), None);
    }
}
