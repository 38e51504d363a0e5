//! Configuration, worker pool, tick cycle, and engine manager for the
//! Tickforge simulation engine.
//!
//! This crate owns the four-phase world loop that drives a simulation
//! run -- scheduling & generators, snapshot & dispatch, resolve & apply,
//! bookkeeping -- and the control plane that runs it on a background
//! thread at a configured cadence.
//!
//! # Modules
//!
//! - [`config`] -- configuration loading from a single YAML document
//!   into [`config::SimulationConfig`], embedding `tickforge-agents`'
//!   tunables rather than duplicating them.
//! - [`worker_pool`] -- the bounded-deadline parallel brain dispatcher
//!   (component C8).
//! - [`tick`] -- the four-phase [`tick::WorldLoop`] (component C10).
//! - [`engine`] -- the [`engine::EngineManager`] control plane
//!   (component C11): start/pause/resume/stop/single-step/reset plus the
//!   published snapshot and event log. A tick that panics on a broken
//!   invariant is caught at this boundary and latches a terminal
//!   [`engine::EngineStatus::Stopped`].
//! - [`error`] -- error types for configuration, ticking, and the engine
//!   manager's control plane.

pub mod config;
pub mod engine;
pub mod error;
pub mod tick;
pub mod worker_pool;

pub use config::SimulationConfig;
pub use engine::{EngineManager, EngineStatus, SimulationEndReason};
pub use error::{ConfigError, EngineError, TickError};
pub use tick::{TickSummary, WorldLoop};
