//! Tick-driven simulation core for the Blockadia village.
//!
//! This crate owns everything that changes over time: the simulation clock,
//! roaming units and their tasks, building timers, build mode and
//! construction, the player's selection, and the event bridge that carries
//! commands in and notifications out. Static world state lives in
//! `blockadia-world`; the resource ledger in `blockadia-ledger`.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with per-field defaults.
//! - [`clock`] -- Tick counter and simulated milliseconds.
//! - [`movement`] -- Straight-line travel between tile centres.
//! - [`unit`] -- Units and their task state machines.
//! - [`simulation`] -- [`Simulation`] and the four-phase tick.
//! - [`tasks`] -- Villager walking, gathering, pickup and delivery.
//! - [`buildings`] -- Upgrades, recruitment, workers and production.
//! - [`build_mode`] -- Ghost preview, placement and construction.
//! - [`selection`] -- Selection state and inspector notifications.
//! - [`input`] -- Click dispatch.
//! - [`bridge`] -- Command routing and the notification outbox.
//! - [`labels`] -- Translated in-world labels.
//! - [`view`] -- Render snapshot.
//! - [`runner`] -- Bounded async tick loop.
//! - [`error`] -- Error types.
//!
//! # Example
//!
//! ```
//! use blockadia_core::{Simulation, SimulationConfig};
//!
//! let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
//! sim.dispatch_json(r#"{"type":"spawnVillager"}"#);
//! sim.tick(100).unwrap();
//! assert_eq!(sim.units().count(), 2);
//! ```

pub mod bridge;
pub mod build_mode;
pub mod buildings;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod labels;
pub mod movement;
pub mod runner;
pub mod selection;
pub mod simulation;
pub mod tasks;
pub mod unit;
pub mod view;

pub use bridge::{EventBridge, NoOpSink, NotificationSink};
pub use build_mode::BuildMode;
pub use clock::{ClockError, SimClock};
pub use config::{ConfigError, SimulationConfig};
pub use error::SimError;
pub use runner::{CommandSource, NoCommands, RunOptions, RunResult, run_simulation};
pub use selection::Selection;
pub use simulation::{Simulation, TickSummary};
pub use unit::{Unit, UnitBody, VillagerTask};
pub use view::WorldView;
