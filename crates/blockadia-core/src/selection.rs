//! Selection state and the inspector notifications it drives.

use blockadia_types::{
    DropId, NodeId, Notification, ResourceSelection, ResourceSource, UnitId,
};

use crate::simulation::Simulation;

/// What the player has selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    /// Nothing.
    #[default]
    None,
    /// A roaming unit.
    Unit(UnitId),
    /// A resource node.
    Node(NodeId),
    /// A dropped resource.
    Drop(DropId),
}

impl Selection {
    /// Whether this selects the given unit.
    pub fn is_unit(self, id: UnitId) -> bool {
        self == Self::Unit(id)
    }

    /// Whether this selects the given node.
    pub fn is_node(self, id: NodeId) -> bool {
        self == Self::Node(id)
    }

    /// Whether this selects the given drop.
    pub fn is_drop(self, id: DropId) -> bool {
        self == Self::Drop(id)
    }

    /// The selected unit, if any.
    pub const fn unit(self) -> Option<UnitId> {
        match self {
            Self::Unit(id) => Some(id),
            _ => None,
        }
    }

    const fn is_resource(self) -> bool {
        matches!(self, Self::Node(_) | Self::Drop(_))
    }
}

impl Simulation {
    /// Replace the selection, closing and opening inspector panels as needed.
    pub(crate) fn set_selection(&mut self, next: Selection) {
        let previous = std::mem::replace(&mut self.selection, next);
        if previous == next {
            return;
        }
        if matches!(previous, Selection::Unit(_)) && !matches!(next, Selection::Unit(_)) {
            self.publish(Notification::UnitSelection(None));
        }
        if previous.is_resource() && !next.is_resource() {
            self.publish(Notification::ResourceSelection(None));
        }
        match next {
            Selection::Unit(id) => {
                let payload = self
                    .units
                    .get(&id)
                    .map(|u| u.selection(self.world.grid()));
                self.publish(Notification::UnitSelection(payload));
            }
            Selection::Node(_) | Selection::Drop(_) => self.refresh_resource_selection(),
            Selection::None => {}
        }
    }

    /// Select `next`, or clear the selection if it is already selected.
    pub(crate) fn toggle_selection(&mut self, next: Selection) {
        if self.selection == next {
            self.set_selection(Selection::None);
        } else {
            self.set_selection(next);
        }
    }

    pub(crate) fn clear_selection(&mut self) {
        self.set_selection(Selection::None);
    }

    /// Re-send the resource inspector for the selected node or drop.
    pub(crate) fn refresh_resource_selection(&mut self) {
        let payload = self.resource_selection();
        self.publish(Notification::ResourceSelection(payload));
    }

    /// Inspector payload for the selected node or drop.
    pub fn resource_selection(&self) -> Option<ResourceSelection> {
        match self.selection {
            Selection::Node(id) => self.world.node(id).map(|node| ResourceSelection {
                source: ResourceSource::Node(id),
                node_kind: Some(node.kind),
                kind: node.kind.yields(),
                remaining: node.quantity,
                nominal_max: self.config.generation.node_quantity,
            }),
            Selection::Drop(id) => self.world.drop_pile(id).map(|pile| ResourceSelection {
                source: ResourceSource::Drop(id),
                node_kind: None,
                kind: pile.cargo.kind,
                remaining: pile.cargo.amount,
                nominal_max: pile.cargo.amount,
            }),
            Selection::Unit(_) | Selection::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        let unit = UnitId::from_random_bytes([1; 16]);
        let node = NodeId::from_random_bytes([2; 16]);
        assert!(Selection::Unit(unit).is_unit(unit));
        assert!(!Selection::Unit(unit).is_node(node));
        assert_eq!(Selection::Unit(unit).unit(), Some(unit));
        assert_eq!(Selection::Node(node).unit(), None);
        assert!(Selection::Drop(DropId::from_random_bytes([3; 16])).is_resource());
    }
}
