//! Error type for simulation commands and ticks.
//!
//! Most variants are soft refusals: the event bridge logs them and carries
//! on, so an invalid UI command is a no-op rather than a crash.

use blockadia_ledger::LedgerError;
use blockadia_types::{BuildingId, DropId, NodeId, UnitId};
use blockadia_world::{PlacementError, WorldError};

use crate::clock::ClockError;

/// Errors returned by [`Simulation`](crate::Simulation) operations.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Clock overflow.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A world-state operation was refused.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The ledger refused a credit or debit.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// A footprint was refused.
    #[error("placement refused: {source}")]
    Placement {
        /// The broken rule.
        #[from]
        source: PlacementError,
    },

    /// A configuration value cannot drive the simulation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong.
        reason: String,
    },

    /// The build-menu key names no building.
    #[error("unknown building kind: {0}")]
    UnknownBuildingKind(String),

    /// A placement was confirmed outside build mode.
    #[error("not in build mode")]
    NotInBuildMode,

    /// The unit does not exist.
    #[error("unit not found: {0}")]
    UnitNotFound(UnitId),

    /// The command needs a villager.
    #[error("unit {0} is not a villager")]
    NotAVillager(UnitId),

    /// The node is gone.
    #[error("resource node {0} no longer exists")]
    NodeGone(NodeId),

    /// The drop is gone.
    #[error("dropped resource {0} no longer exists")]
    DropGone(DropId),

    /// The node is surrounded on all four sides.
    #[error("no free tile next to node {0}")]
    NoApproachTile(NodeId),

    /// The building does not exist.
    #[error("building not found: {0}")]
    BuildingNotFound(BuildingId),

    /// No idle villager is available to station.
    #[error("no idle villager available for building {0}")]
    NoIdleVillager(BuildingId),

    /// The settlement is at its population cap.
    #[error("population cap reached ({headcount}/{cap})")]
    PopulationCapReached {
        /// Units alive, stationed or in training.
        headcount: u32,
        /// Effective cap.
        cap: u32,
    },
}
