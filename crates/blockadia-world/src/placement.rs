//! Build-mode placement rules.
//!
//! The pointer tile is the footprint origin for every kind. Generic rule:
//! the whole footprint is on the grid and free of buildings, sites, nodes,
//! drops and units. Mines additionally need a matching deposit under the
//! origin tile (that tile is exempt from the free check because the deposit
//! is consumed), and a lumber mill needs a tree within one tile of its
//! footprint.

use blockadia_types::{BuildingKind, NodeId, NodeKind, TilePos};

use crate::building::blueprint;
use crate::grid::Grid;
use crate::occupancy::Occupant;
use crate::world_map::{UnitTiles, WorldMap};

/// Why a footprint was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    /// The kind cannot be placed from the build menu.
    #[error("{0:?} cannot be placed")]
    NotPlaceable(BuildingKind),

    /// Part of the footprint is off the grid.
    #[error("footprint at {origin} does not fit on the grid")]
    OutOfBounds {
        /// Requested origin.
        origin: TilePos,
    },

    /// A static entity holds a footprint tile.
    #[error("tile {tile} is occupied by {occupant:?}")]
    Occupied {
        /// The blocked tile.
        tile: TilePos,
        /// What holds it.
        occupant: Occupant,
    },

    /// A unit stands on a footprint tile.
    #[error("a unit is standing on {tile}")]
    UnitInTheWay {
        /// The blocked tile.
        tile: TilePos,
    },

    /// A mine's origin tile lacks the matching deposit.
    #[error("{required:?} deposit required at {tile}")]
    MissingDeposit {
        /// Deposit kind the mine needs.
        required: NodeKind,
        /// The origin tile.
        tile: TilePos,
    },

    /// No tree stands next to a lumber mill footprint.
    #[error("no tree within one tile of the footprint at {origin}")]
    NoTreeNearby {
        /// Requested origin.
        origin: TilePos,
    },
}

/// An accepted placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPlan {
    /// Kind to build.
    pub kind: BuildingKind,
    /// Footprint origin.
    pub origin: TilePos,
    /// Footprint edge length.
    pub size: u8,
    /// Deposit removed when the site is created.
    pub consumed_node: Option<NodeId>,
}

/// Check whether `kind` can be placed with its origin at `origin`.
///
/// # Errors
///
/// The first rule the footprint breaks.
pub fn validate(
    world: &WorldMap,
    kind: BuildingKind,
    origin: TilePos,
    units: &UnitTiles,
) -> Result<PlacementPlan, PlacementError> {
    let print = blueprint(kind);
    if !print.placeable {
        return Err(PlacementError::NotPlaceable(kind));
    }
    if !world.grid().footprint_in_bounds(origin, print.size) {
        return Err(PlacementError::OutOfBounds { origin });
    }

    let consumed_node = match print.required_node {
        Some(required) => match world.node_at(origin) {
            Some(node) if node.kind == required => Some(node.id),
            _ => {
                return Err(PlacementError::MissingDeposit {
                    required,
                    tile: origin,
                });
            }
        },
        None => None,
    };

    for tile in Grid::footprint(origin, print.size) {
        if consumed_node.is_some() && tile == origin {
            continue;
        }
        if let Some(occupant) = world.occupancy().occupant(tile) {
            return Err(PlacementError::Occupied { tile, occupant });
        }
        if units.contains(&tile) {
            return Err(PlacementError::UnitInTheWay { tile });
        }
    }
    if consumed_node.is_some() && units.contains(&origin) {
        return Err(PlacementError::UnitInTheWay { tile: origin });
    }

    if print.needs_adjacent_tree {
        let has_tree = world
            .grid()
            .perimeter(origin, print.size, 1)
            .into_iter()
            .any(|tile| world.node_at(tile).is_some_and(|n| n.kind == NodeKind::Tree));
        if !has_tree {
            return Err(PlacementError::NoTreeNearby { origin });
        }
    }

    Ok(PlacementPlan {
        kind,
        origin,
        size: print.size,
        consumed_node,
    })
}
