//! Error types for the Tickforge engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps every failure
//! mode during startup and the run itself, so `main` can propagate
//! everything with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tickforge_core::ConfigError,
    },

    /// Starting, pausing, stopping, or single-stepping the engine
    /// manager failed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine-manager error.
        #[from]
        source: tickforge_core::EngineError,
    },
}
