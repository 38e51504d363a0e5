//! Error types for the world crate.

use tickforge_types::{EntityId, ResourceNodeId};

/// Errors surfaced by world-state operations. Per the core's error
/// taxonomy, none of these are raised for ordinary gameplay outcomes
/// (a blocked move, a dead target) -- those are downgraded to Rest by
/// the conflict resolver and never reach a `Result`. These are reserved
/// for malformed construction inputs.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("resource node not found: {0}")]
    ResourceNodeNotFound(ResourceNodeId),

    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidGridDimensions { width: i32, height: i32 },

    #[error("duplicate entity id: {0}")]
    DuplicateEntity(EntityId),
}
