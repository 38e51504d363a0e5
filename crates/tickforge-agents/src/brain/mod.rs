//! The AI brain: a hybrid dispatcher that runs the utility evaluator for
//! entities in a decision state and a fixed state handler for everyone
//! else, producing one `ActionProposal` per ready actor per tick.
//!
//! # Submodules
//!
//! - [`goals`] -- the nine goal scorers and the weighted top-three
//!   sampler that picks a target state out of a decision state.
//! - [`states`] -- the state handlers, one per `AiState` variant, that
//!   turn a chosen (or ongoing) state into this tick's proposal.
//! - [`pathing`] -- the greedy/A* step planner handlers share.

pub mod goals;
pub mod pathing;
pub mod states;

use tickforge_types::{ActionProposal, Entity};
use tickforge_world::{perception, Snapshot};

use crate::config::AgentsConfig;
use crate::registries::{ItemRegistry, SkillRegistry};

/// The read-only context a decision needs beyond the actor and the
/// snapshot: gameplay tunables and the embedder's content registries.
pub struct BrainContext<'a> {
    /// Gameplay tunables (flee thresholds, leash radius, timers).
    pub config: &'a AgentsConfig,
    /// Item tag -> mechanics lookup, for potion/auto-equip decisions.
    pub items: &'a ItemRegistry,
    /// Skill tag -> mechanics lookup, for the skill-vs-attack choice.
    pub skills: &'a SkillRegistry,
}

/// Builds this tick's perception and dispatches to the evaluator (in a
/// decision state) or the registered state handler (in an execution
/// state), returning the resulting proposal.
#[must_use]
pub fn decide(actor: &Entity, snapshot: &Snapshot, ctx: &BrainContext<'_>) -> ActionProposal {
    let view = perception::build(snapshot, actor);
    let state = if actor.ai_state.is_decision_state() {
        goals::evaluate(actor, &view, snapshot, ctx.config)
    } else {
        actor.ai_state
    };
    states::handle(state, actor, &view, snapshot, ctx)
}
