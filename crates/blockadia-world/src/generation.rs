//! Starting-world generation.
//!
//! The village sits in the middle of the map. Forests and mineral deposits
//! are clusters of nodes scattered around random centres; a candidate tile
//! that is off the grid, already occupied, or too close to the village is
//! skipped without retry, so a cluster may come out smaller than asked.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use blockadia_types::{BuildingId, BuildingKind, NodeId, NodeKind, TilePos};

use crate::building::{Building, blueprint};
use crate::error::WorldError;
use crate::grid::Grid;
use crate::resource::ResourceNode;
use crate::world_map::WorldMap;

/// One family of resource clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Node kind placed in these clusters.
    pub kind: NodeKind,
    /// Number of cluster centres.
    pub clusters: u32,
    /// Candidate nodes per cluster.
    pub nodes_per_cluster: u32,
    /// Maximum offset of a node from its centre on each axis.
    pub spread: i32,
}

/// Inputs to [`create_starting_world`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParams {
    /// Cluster families, placed in order.
    pub clusters: Vec<ClusterSpec>,
    /// Cluster centres stay this many tiles away from the map edge.
    pub margin: u32,
    /// Starting quantity of every node.
    pub node_quantity: u32,
    /// Nodes stay at least this far (Chebyshev) from the village footprint.
    pub village_clearance: u32,
}

/// A freshly generated world.
#[derive(Debug, Clone)]
pub struct StartingWorld {
    /// The populated map.
    pub map: WorldMap,
    /// The central village.
    pub village: BuildingId,
}

/// Draw 16 random bytes for an identifier.
pub fn random_id_bytes(rng: &mut impl Rng) -> [u8; 16] {
    rng.random()
}

/// Build the starting world: central village plus resource clusters.
///
/// # Errors
///
/// [`WorldError`] if the grid is too small to hold the village.
pub fn create_starting_world(
    grid: Grid,
    params: &GenerationParams,
    rng: &mut impl Rng,
) -> Result<StartingWorld, WorldError> {
    let mut map = WorldMap::new(grid);

    let size = blueprint(BuildingKind::Village).size;
    let half = i32::from(size / 2);
    let origin = grid.center_tile().offset(-half, -half);
    let village = BuildingId::from_random_bytes(random_id_bytes(rng));
    map.add_building(Building::new(village, BuildingKind::Village, origin))?;

    let placed = scatter_clusters(&mut map, params, origin, size, rng);
    info!(
        width = grid.width(),
        height = grid.height(),
        village_origin = %origin,
        nodes = placed,
        "Starting world generated"
    );

    Ok(StartingWorld { map, village })
}

/// Scatter every cluster family onto `map`. Returns the number of nodes
/// placed.
pub fn scatter_clusters(
    map: &mut WorldMap,
    params: &GenerationParams,
    village_origin: TilePos,
    village_size: u8,
    rng: &mut impl Rng,
) -> usize {
    let grid = *map.grid();
    let mut placed = 0_usize;

    for spec in &params.clusters {
        let spread = spec.spread.max(0);
        for _ in 0..spec.clusters {
            let center = TilePos::new(
                random_axis(grid.width(), params.margin, rng),
                random_axis(grid.height(), params.margin, rng),
            );
            for _ in 0..spec.nodes_per_cluster {
                let tile = center.offset(
                    rng.random_range(-spread..=spread),
                    rng.random_range(-spread..=spread),
                );
                if !map.is_static_free(tile)
                    || footprint_distance(tile, village_origin, village_size)
                        <= params.village_clearance
                {
                    continue;
                }
                let id = NodeId::from_random_bytes(random_id_bytes(rng));
                if map
                    .add_node(ResourceNode::new(id, spec.kind, tile, params.node_quantity))
                    .is_ok()
                {
                    placed = placed.saturating_add(1);
                }
            }
        }
        debug!(
            kind = ?spec.kind,
            total = map.nodes().count_kind(spec.kind),
            "Cluster family placed"
        );
    }
    placed
}

/// A random coordinate in `[margin, extent - margin)`, or anywhere on the
/// axis when the margin leaves no room.
fn random_axis(extent: u32, margin: u32, rng: &mut impl Rng) -> i32 {
    let lo = margin;
    let hi = extent.saturating_sub(margin);
    let value = if lo < hi {
        rng.random_range(lo..hi)
    } else {
        rng.random_range(0..extent.max(1))
    };
    i32::try_from(value).unwrap_or(0)
}

/// Chebyshev distance from a tile to the nearest footprint tile (zero inside).
fn footprint_distance(tile: TilePos, origin: TilePos, size: u8) -> u32 {
    let span = i32::from(size.max(1)).saturating_sub(1);
    let far = origin.offset(span, span);
    let dx = axis_gap(tile.x, origin.x, far.x);
    let dy = axis_gap(tile.y, origin.y, far.y);
    dx.max(dy)
}

const fn axis_gap(value: i32, lo: i32, hi: i32) -> u32 {
    if value < lo {
        lo.abs_diff(value)
    } else if value > hi {
        value.abs_diff(hi)
    } else {
        0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn params() -> GenerationParams {
        GenerationParams {
            clusters: vec![
                ClusterSpec {
                    kind: NodeKind::Tree,
                    clusters: 6,
                    nodes_per_cluster: 10,
                    spread: 3,
                },
                ClusterSpec {
                    kind: NodeKind::Gold,
                    clusters: 2,
                    nodes_per_cluster: 4,
                    spread: 2,
                },
            ],
            margin: 3,
            node_quantity: 1000,
            village_clearance: 2,
        }
    }

    #[test]
    fn village_is_centred() {
        let mut rng = StdRng::seed_from_u64(42);
        let world = create_starting_world(Grid::default(), &params(), &mut rng).unwrap();
        let village = world.map.building(world.village).unwrap();
        assert_eq!(village.origin, TilePos::new(39, 29));
        assert_eq!(village.kind, BuildingKind::Village);
    }

    #[test]
    fn nodes_respect_bounds_and_clearance() {
        let mut rng = StdRng::seed_from_u64(7);
        let world = create_starting_world(Grid::default(), &params(), &mut rng).unwrap();
        let origin = TilePos::new(39, 29);
        assert!(!world.map.nodes().is_empty());
        for node in world.map.nodes().iter() {
            assert!(world.map.grid().in_bounds(node.tile));
            assert!(footprint_distance(node.tile, origin, 3) > 2);
            assert_eq!(node.quantity, 1000);
        }
        // One index entry per node plus nine village tiles.
        assert_eq!(world.map.occupancy().len(), world.map.nodes().len() + 9);
    }

    #[test]
    fn same_seed_same_world() {
        let a = create_starting_world(Grid::default(), &params(), &mut StdRng::seed_from_u64(3))
            .unwrap();
        let b = create_starting_world(Grid::default(), &params(), &mut StdRng::seed_from_u64(3))
            .unwrap();
        let tiles_a: Vec<_> = a.map.nodes().iter().map(|n| (n.id, n.tile)).collect();
        let tiles_b: Vec<_> = b.map.nodes().iter().map(|n| (n.id, n.tile)).collect();
        assert_eq!(tiles_a, tiles_b);
        assert_eq!(a.village, b.village);
    }

    #[test]
    fn footprint_distance_is_zero_inside() {
        assert_eq!(footprint_distance(TilePos::new(40, 30), TilePos::new(39, 29), 3), 0);
        assert_eq!(footprint_distance(TilePos::new(43, 30), TilePos::new(39, 29), 3), 2);
    }

    #[test]
    fn tiny_grid_does_not_panic() {
        let mut rng = StdRng::seed_from_u64(1);
        let world = create_starting_world(Grid::new(3, 3, 32), &params(), &mut rng).unwrap();
        assert!(world.map.nodes().is_empty());
    }
}
