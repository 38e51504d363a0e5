//! Error types for the tick cycle and engine manager.
//!
//! Per this workspace's error taxonomy, ordinary gameplay outcomes are
//! never errors -- a blocked move or a dead target downgrades to Rest
//! via [`tickforge_types::RejectionReason`] in the resolver, never a
//! `Result`. These variants are reserved for malformed configuration and
//! control-plane misuse the caller is expected to handle, not the brain
//! or resolver.

use tickforge_world::WorldError;

pub use crate::config::ConfigError;

/// Errors surfaced by a single tick's execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Errors surfaced by the engine manager's control plane.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine is already running")]
    AlreadyRunning,

    #[error("engine is not running")]
    NotRunning,

    #[error("background tick loop panicked or was dropped without a result")]
    WorkerLost,

    #[error("cannot single-step while the background loop is running")]
    RunningInBackground,

    #[error("engine stopped after an invariant violation; call reset before starting again")]
    InvariantViolationStopped,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tick(#[from] TickError),
}
