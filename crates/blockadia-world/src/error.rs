//! Error types for the `blockadia-world` crate.
//!
//! All fallible world operations return [`WorldError`]. Placement checks have
//! their own [`PlacementError`](crate::placement::PlacementError) because the
//! UI treats them as soft refusals rather than faults.

use blockadia_types::{BuildingId, BuildingKind, DropId, NodeId, SiteId, TilePos};

use crate::occupancy::Occupant;

/// Errors that can occur during world-state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The tile lies outside the grid.
    #[error("tile {0} is out of bounds")]
    OutOfBounds(TilePos),

    /// The tile is already claimed.
    #[error("tile {tile} is already occupied by {occupant:?}")]
    TileOccupied {
        /// The contested tile.
        tile: TilePos,
        /// What holds it.
        occupant: Occupant,
    },

    /// A building was not found.
    #[error("building not found: {0}")]
    BuildingNotFound(BuildingId),

    /// A construction site was not found.
    #[error("construction site not found: {0}")]
    SiteNotFound(SiteId),

    /// A resource node was not found.
    #[error("resource node not found: {0}")]
    NodeNotFound(NodeId),

    /// A dropped resource was not found.
    #[error("dropped resource not found: {0}")]
    DropNotFound(DropId),

    /// The building kind cannot be upgraded.
    #[error("{kind:?} cannot be upgraded")]
    NotUpgradable {
        /// The building kind.
        kind: BuildingKind,
    },

    /// The building is already at its highest level.
    #[error("building {0} is already at max level")]
    AlreadyMaxLevel(BuildingId),

    /// An upgrade is already running.
    #[error("building {0} is already upgrading")]
    AlreadyUpgrading(BuildingId),

    /// The building kind does not recruit units.
    #[error("{kind:?} cannot recruit units")]
    CannotRecruit {
        /// The building kind.
        kind: BuildingKind,
    },

    /// A recruitment is already running.
    #[error("building {0} is already recruiting")]
    AlreadyRecruiting(BuildingId),

    /// The building kind takes no workers.
    #[error("{kind:?} has no worker slots")]
    NoWorkerSlots {
        /// The building kind.
        kind: BuildingKind,
    },

    /// Every worker slot is taken.
    #[error("building {building} is full ({max} workers)")]
    WorkersFull {
        /// The full building.
        building: BuildingId,
        /// Slot count.
        max: u8,
    },

    /// No worker is stationed to release.
    #[error("building {0} has no assigned workers")]
    NoWorkers(BuildingId),

    /// A timer was configured with zero duration.
    #[error("timer duration must be non-zero")]
    ZeroDuration,

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in world calculation")]
    ArithmeticOverflow,
}
