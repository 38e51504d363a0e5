//! The action pipeline: per-verb cost tables, combat math, validation
//! against live world state, per-verb execution, and the conflict
//! resolver that ties them together into one tick's worth of proposals.
//!
//! # Submodules
//!
//! - [`costs`] -- stamina and `next_act_at` cost tables.
//! - [`combat`] -- damage resolution shared by `Attack` and `UseSkill`.
//! - [`validation`] -- live-world checks that turn a proposal into either
//!   "go ahead" or a [`tickforge_types::RejectionReason`].
//! - [`handlers`] -- per-verb execution once a proposal has validated.
//! - [`conflict`] -- the resolver: total order, sequential validate/apply,
//!   cell-claim tracking, downgrade-to-Rest on rejection.

pub mod combat;
pub mod conflict;
pub mod costs;
pub mod handlers;
pub mod validation;

pub use conflict::resolve_tick;

use crate::config::AgentsConfig;
use crate::registries::{ItemRegistry, SkillRegistry};

/// The read-only context every stage of the action pipeline needs beyond
/// `WorldState` itself: gameplay tunables and the embedder's content
/// registries.
pub struct ActionContext<'a> {
    /// Gameplay tunables (stamina rates, damage variance, thresholds).
    pub config: &'a AgentsConfig,
    /// Item tag -> mechanics lookup, populated by the embedder.
    pub items: &'a ItemRegistry,
    /// Skill tag -> mechanics lookup, populated by the embedder.
    pub skills: &'a SkillRegistry,
}
