//! Error types for the agents crate.
//!
//! Per the core's error taxonomy (ordinary gameplay outcomes are never
//! errors — a blocked move or a dead target downgrades to Rest via
//! [`tickforge_types::RejectionReason`] in the resolver, never a `Result`),
//! these variants are reserved for malformed construction inputs and
//! internal invariant breaches the `EngineManager` is expected to catch as
//! a panic, not recover from inline.

use tickforge_types::EntityId;

/// Errors surfaced by agent-domain construction and bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("entity {0} has no inventory but an inventory-bearing action was attempted")]
    NoInventory(EntityId),

    #[error("arithmetic overflow while computing {context}")]
    ArithmeticOverflow { context: String },

    #[error("unknown skill tag: {0}")]
    UnknownSkill(String),

    #[error("unknown item tag: {0}")]
    UnknownItem(String),
}
