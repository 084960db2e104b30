//! Tile occupancy index for static entities.
//!
//! Buildings, construction sites, resource nodes and dropped resources each
//! claim tiles here, and at most one of them may hold a tile at a time.
//! Units are not indexed: they move continuously and may overlap each other,
//! so unit presence is supplied by the caller at query time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use blockadia_types::{BuildingId, DropId, NodeId, SiteId, TilePos};

use crate::error::WorldError;
use crate::grid::Grid;

/// What holds a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    /// Part of a completed building footprint.
    Building(BuildingId),
    /// Part of a construction site footprint.
    Site(SiteId),
    /// A resource node.
    Node(NodeId),
    /// A pile of dropped cargo.
    Drop(DropId),
}

/// Map from tile to its single static occupant.
#[derive(Debug, Clone, Default)]
pub struct OccupancyIndex {
    tiles: BTreeMap<TilePos, Occupant>,
}

impl OccupancyIndex {
    /// Create an empty index.
    pub const fn new() -> Self {
        Self {
            tiles: BTreeMap::new(),
        }
    }

    /// The occupant of `tile`, if any.
    pub fn occupant(&self, tile: TilePos) -> Option<Occupant> {
        self.tiles.get(&tile).copied()
    }

    /// Whether nothing static holds `tile`.
    pub fn is_free(&self, tile: TilePos) -> bool {
        !self.tiles.contains_key(&tile)
    }

    /// Number of claimed tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no tile is claimed.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Claim a single tile.
    ///
    /// # Errors
    ///
    /// [`WorldError::TileOccupied`] if another occupant already holds it.
    pub fn claim(&mut self, tile: TilePos, occupant: Occupant) -> Result<(), WorldError> {
        if let Some(existing) = self.occupant(tile) {
            return Err(WorldError::TileOccupied {
                tile,
                occupant: existing,
            });
        }
        self.tiles.insert(tile, occupant);
        Ok(())
    }

    /// Claim every tile of a footprint, or none of them.
    ///
    /// # Errors
    ///
    /// [`WorldError::TileOccupied`] naming the first blocked tile.
    pub fn claim_footprint(
        &mut self,
        origin: TilePos,
        size: u8,
        occupant: Occupant,
    ) -> Result<(), WorldError> {
        if let Some((tile, existing)) = Grid::footprint(origin, size)
            .find_map(|tile| self.occupant(tile).map(|o| (tile, o)))
        {
            return Err(WorldError::TileOccupied {
                tile,
                occupant: existing,
            });
        }
        for tile in Grid::footprint(origin, size) {
            self.tiles.insert(tile, occupant);
        }
        Ok(())
    }

    /// Release `tile` if `occupant` holds it. Returns whether anything was
    /// released.
    pub fn release(&mut self, tile: TilePos, occupant: Occupant) -> bool {
        if self.occupant(tile) == Some(occupant) {
            self.tiles.remove(&tile);
            true
        } else {
            false
        }
    }

    /// Release every tile of a footprint held by `occupant`.
    pub fn release_footprint(&mut self, origin: TilePos, size: u8, occupant: Occupant) {
        for tile in Grid::footprint(origin, size) {
            self.release(tile, occupant);
        }
    }

    /// All claimed tiles with their occupants.
    pub fn iter(&self) -> impl Iterator<Item = (&TilePos, &Occupant)> {
        self.tiles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(byte: u8) -> Occupant {
        Occupant::Node(NodeId::from_random_bytes([byte; 16]))
    }

    #[test]
    fn claim_and_release() {
        let mut index = OccupancyIndex::new();
        let tile = TilePos::new(3, 3);
        assert!(index.claim(tile, node(1)).is_ok());
        assert!(!index.is_free(tile));
        assert!(matches!(
            index.claim(tile, node(2)),
            Err(WorldError::TileOccupied { .. })
        ));
        assert!(!index.release(tile, node(2)));
        assert!(index.release(tile, node(1)));
        assert!(index.is_free(tile));
    }

    #[test]
    fn footprint_claim_is_all_or_nothing() {
        let mut index = OccupancyIndex::new();
        let blocker = TilePos::new(5, 6);
        assert!(index.claim(blocker, node(1)).is_ok());
        let building = Occupant::Building(BuildingId::from_random_bytes([9; 16]));
        assert!(index.claim_footprint(TilePos::new(4, 4), 3, building).is_err());
        assert_eq!(index.len(), 1);
        assert!(index.claim_footprint(TilePos::new(10, 10), 3, building).is_ok());
        assert_eq!(index.len(), 10);
        index.release_footprint(TilePos::new(10, 10), 3, building);
        assert_eq!(index.len(), 1);
    }
}
