//! The conflict resolver: the only place a tick's worth of
//! [`ActionProposal`]s actually mutate [`WorldState`].
//!
//! Proposals arrive already ordered by `(next_act_at, actor_id)` ascending
//! -- the same order [`WorldState::ready_actors`] handed to the worker
//! pool -- so the resolver itself never re-sorts; it trusts the caller's
//! order as the tie-break contract. Each proposal is validated against
//! the world *as mutated by every earlier proposal this tick*, then
//! either applied or downgraded to `Rest` with the rejection recorded as
//! an event. This is what keeps a doorway contest, a kill-then-retarget,
//! and a contested move destination all deterministic regardless of
//! which worker thread produced which proposal.

use std::collections::BTreeSet;

use tickforge_types::{ActionProposal, EventCategory, EventRecord};
use tickforge_world::WorldState;

use super::validation::validate;
use super::{handlers, ActionContext};

/// Applies one tick's worth of proposals in scheduling order, returning
/// every event produced (including a downgrade's own rejection event).
pub fn resolve_tick(world: &mut WorldState, proposals: &[ActionProposal], ctx: &ActionContext<'_>) -> Vec<EventRecord> {
    let tick = world.tick;
    let mut claimed_cells: BTreeSet<tickforge_types::Position> = BTreeSet::new();
    let mut events = Vec::new();

    for proposal in proposals {
        let outcome = validate(world, proposal, &claimed_cells, ctx).map(|_| ());
        match outcome {
            Ok(()) => {
                if let tickforge_types::ActionVerb::Move = proposal.verb {
                    if let tickforge_types::ProposalTarget::Position(dest) = proposal.target {
                        claimed_cells.insert(dest);
                    }
                }
                events.extend(handlers::apply(world, proposal, ctx, tick));
            }
            Err(reason) => {
                events.push(EventRecord {
                    id: tickforge_types::EventId::from_raw(0),
                    tick,
                    category: EventCategory::Rest,
                    message: format!("entity {} downgraded to Rest: {reason:?}", proposal.actor_id),
                });
                events.extend(handlers::apply(world, &ActionProposal::rest(proposal.actor_id), ctx, tick));
            }
        }
        apply_new_ai_state(world, proposal);
    }

    events
}

fn apply_new_ai_state(world: &mut WorldState, proposal: &ActionProposal) {
    let Some(new_state) = proposal.new_ai_state else {
        return;
    };
    if let Some(actor) = world.entities.get_mut(&proposal.actor_id) {
        actor.ai_state = new_state;
    }
}
