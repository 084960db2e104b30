//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and the run
//! loop so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: blockadia_core::ConfigError,
    },

    /// World creation or a tick failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: blockadia_core::SimError,
    },

    /// The player script could not be loaded.
    #[error("script error: {message}")]
    Script {
        /// Description of the failure.
        message: String,
    },
}
