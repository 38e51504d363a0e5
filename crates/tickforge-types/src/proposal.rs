//! The action-proposal type produced by the AI brain and consumed by the
//! conflict resolver.

use serde::{Deserialize, Serialize};

use crate::enums::{ActionVerb, AiState};
use crate::ids::{EntityId, ItemId};
use crate::structs::Position;

/// What an `ActionProposal` acts upon. Which variant is valid depends on
/// the proposal's verb (`Move` takes a `Position`, `Attack`/`UseSkill`
/// take an `Entity`, `UseItem` takes an `Item`, `Rest`/`Harvest`/`Loot`
/// act on the actor's current cell and take `None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalTarget {
    None,
    Position(Position),
    Entity(EntityId),
    Item(ItemId),
}

/// An actor's intent for the current tick, produced by the brain and
/// valid only relative to the snapshot it was computed from. Proposals
/// are inert records — producing one has no side effect until the
/// conflict resolver validates and applies it against the live world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionProposal {
    pub actor_id: EntityId,
    pub verb: ActionVerb,
    pub target: ProposalTarget,
    pub new_ai_state: Option<AiState>,
}

impl ActionProposal {
    #[must_use]
    pub const fn rest(actor_id: EntityId) -> Self {
        Self {
            actor_id,
            verb: ActionVerb::Rest,
            target: ProposalTarget::None,
            new_ai_state: None,
        }
    }
}
