//! World state and its supporting pieces: the tile grid, the spatial
//! index, the faction registry, entity spawn generators, and the
//! immutable per-tick snapshot.
//!
//! # Modules
//!
//! - [`grid`] -- the fixed-size tile grid and line-of-sight queries.
//! - [`spatial_index`] -- bucketed entity lookup by position.
//! - [`faction`] -- tile ownership and faction hostility.
//! - [`world_state`] -- the authoritative mutable simulation state.
//! - [`snapshot`] -- the immutable per-tick view readers consume.
//! - [`perception`] -- what one entity can see, built from a snapshot.
//! - [`generator`] -- deterministic entity spawning.
//! - [`error`] -- error types for world-state operations.

pub mod error;
pub mod faction;
pub mod generator;
pub mod grid;
pub mod perception;
pub mod snapshot;
pub mod spatial_index;
pub mod world_state;

pub use error::WorldError;
pub use faction::FactionRegistry;
pub use generator::{run_generators, SpawnGenerator};
pub use grid::Grid;
pub use perception::Perception;
pub use snapshot::Snapshot;
pub use spatial_index::{SpatialIndex, DEFAULT_CELL_SIZE};
pub use world_state::WorldState;
