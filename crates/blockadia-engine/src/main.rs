//! Headless engine binary for the Blockadia simulation.
//!
//! Runs the village without a renderer: a scripted player stands in for
//! the UI and notifications go to the log.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$BLOCKADIA_CONFIG` or `blockadia-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Generate the starting world
//! 4. Load the player script
//! 5. Run the bounded tick loop
//! 6. Log the final state and notification totals

mod error;
mod log_sink;
mod script;

use std::path::PathBuf;

use blockadia_core::runner::{self, RunOptions};
use blockadia_core::{Simulation, SimulationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::log_sink::LogSink;
use crate::script::ScriptedPlayer;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "BLOCKADIA_CONFIG";

/// Configuration file used when [`CONFIG_ENV`] is unset.
const DEFAULT_CONFIG_PATH: &str = "blockadia-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, world creation or a tick fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config_path = config_path();
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config);
    info!("blockadia-engine starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        seed = config.world.seed,
        width = config.world.width,
        height = config.world.height,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.simulation.max_ticks,
        "Configuration"
    );

    // 3. Generate the starting world.
    let options = RunOptions {
        max_ticks: config.simulation.max_ticks,
        tick_interval_ms: config.world.tick_interval_ms,
        realtime: config.simulation.realtime,
    };
    let mut sim = Simulation::new(config)?;

    // 4. Load the player script.
    let script = script::load_script(&config_path)?;
    let mut player = ScriptedPlayer::new(script);
    let mut sink = LogSink::new();

    // 5. Run.
    let result = runner::run_simulation(&mut sim, &mut player, &mut sink, options).await?;

    // 6. Log results.
    runner::log_run_end(&result, &sim);
    sink.log_totals();
    info!(total_ticks = result.total_ticks, "blockadia-engine shutdown complete");

    Ok(())
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load the configuration, falling back to defaults when the file is
/// missing. The flag reports whether the file was read.
fn load_config(path: &std::path::Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}

fn init_tracing(config: &SimulationConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
