//! Shared type definitions for the Blockadia village simulation.
//!
//! Everything that crosses the event bridge lives here so the simulation and
//! the presentation layer agree on one vocabulary. Types flow to `TypeScript`
//! via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`enums`] -- Resource, building, unit and language enumerations
//! - [`structs`] -- Positions, the wallet, cargo and UI snapshots
//! - [`bridge`] -- Inbound commands and outbound notifications

pub mod bridge;
pub mod enums;
pub mod ids;
pub mod structs;

pub use bridge::{
    BuildModeState, BuildingTarget, Celebration, Command, ConstructionCompleted,
    ConstructionProgress, FloatingText, NodeDepleted, Notification, PointerTarget, UnitSpawned,
};
pub use enums::{BuildingKind, Language, NodeKind, ResourceKind, UnitActivity, UnitKind};
pub use ids::{BuildingId, DropId, NodeId, SiteId, UnitId};
pub use structs::{
    BuildingPatch, BuildingSnapshot, Cargo, ConstructionSnapshot, GhostPreview,
    PopulationSnapshot, ResourceSelection, ResourceSource, ResourceWallet, TilePos, UnitSelection,
    WorldPoint,
};
