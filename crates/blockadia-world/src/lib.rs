//! Static world state for the Blockadia simulation.
//!
//! This crate models everything that does not walk: the tile grid and its
//! occupancy index, depletable resource nodes, dropped cargo, completed
//! buildings with their timers, construction sites, placement rules and
//! starting-world generation. Units and the tick loop live in
//! `blockadia-core`.
//!
//! # Modules
//!
//! - [`grid`] -- Grid geometry: bounds, tile centres, footprints, rings.
//! - [`occupancy`] -- One static occupant per tile.
//! - [`progress`] -- Tick-advanced one-shot and repeating timers.
//! - [`resource`] -- Resource nodes with reserve-then-settle depletion.
//! - [`drops`] -- Dropped cargo piles.
//! - [`building`] -- Blueprints and per-building upgrade, recruit, worker
//!   and production state.
//! - [`construction`] -- Construction sites.
//! - [`placement`] -- Build-mode footprint validation.
//! - [`generation`] -- Village placement and clustered node scattering.
//! - [`world_map`] -- [`WorldMap`], the container tying it all together.
//! - [`error`] -- Error types.

pub mod building;
pub mod construction;
pub mod drops;
pub mod error;
pub mod generation;
pub mod grid;
pub mod occupancy;
pub mod placement;
pub mod progress;
pub mod resource;
pub mod world_map;

pub use building::{Blueprint, Building, BuildingTick, ProductionRule, blueprint};
pub use construction::ConstructionSite;
pub use drops::DroppedResource;
pub use error::WorldError;
pub use generation::{
    ClusterSpec, GenerationParams, StartingWorld, create_starting_world, random_id_bytes,
};
pub use grid::Grid;
pub use occupancy::Occupant;
pub use placement::{PlacementError, PlacementPlan};
pub use resource::{Depletion, ResourceNode};
pub use world_map::{DropOutcome, UnitTiles, WorldMap};
