//! Validates one [`ActionProposal`] against the live [`WorldState`],
//! producing a [`RejectionReason`] when the action can no longer
//! succeed. Everything here is a read-only check -- mutation happens
//! only after validation passes, in [`crate::actions::handlers`].

use std::collections::BTreeSet;

use tickforge_types::{ActionVerb, ActionProposal, Entity, Position, ProposalTarget, RejectionReason};
use tickforge_world::WorldState;

use super::{costs, ActionContext};

/// Checks a proposal against the world as it stands *right now* --
/// including any mutations earlier proposals in this same tick already
/// applied. Returns the live actor on success so callers don't have to
/// look it up again.
pub fn validate<'w>(
    world: &'w WorldState,
    proposal: &ActionProposal,
    claimed_cells: &BTreeSet<Position>,
    ctx: &ActionContext<'_>,
) -> Result<&'w Entity, RejectionReason> {
    let actor = world
        .entities
        .get(&proposal.actor_id)
        .filter(|e| e.is_alive())
        .ok_or(RejectionReason::ActorDead)?;

    match proposal.verb {
        ActionVerb::Rest => {}
        ActionVerb::Move => validate_move(world, actor, proposal, claimed_cells)?,
        ActionVerb::Attack => validate_attack(world, actor, proposal)?,
        ActionVerb::UseSkill => validate_use_skill(world, actor, proposal, ctx)?,
        ActionVerb::UseItem => validate_use_item(actor, proposal, ctx)?,
        ActionVerb::Loot => validate_loot(world, actor)?,
        ActionVerb::Harvest => validate_harvest(world, actor, proposal)?,
    }

    if costs::stamina_cost_for(actor, proposal, ctx) > actor.stats.stamina {
        return Err(RejectionReason::InsufficientStamina);
    }

    Ok(actor)
}

fn target_position(proposal: &ActionProposal) -> Option<Position> {
    match proposal.target {
        ProposalTarget::Position(pos) => Some(pos),
        _ => None,
    }
}

fn target_entity_id(proposal: &ActionProposal) -> Option<tickforge_types::EntityId> {
    match proposal.target {
        ProposalTarget::Entity(id) => Some(id),
        _ => None,
    }
}

fn validate_move(
    world: &WorldState,
    actor: &Entity,
    proposal: &ActionProposal,
    claimed_cells: &BTreeSet<Position>,
) -> Result<(), RejectionReason> {
    let dest = target_position(proposal).ok_or(RejectionReason::BlockedCell)?;
    if !dest.is_adjacent_to(actor.position) && dest != actor.position {
        return Err(RejectionReason::OutOfRange);
    }
    if claimed_cells.contains(&dest) {
        return Err(RejectionReason::CellClaimed);
    }
    if !world.grid.is_walkable(dest) {
        return Err(RejectionReason::BlockedCell);
    }
    let occupied = world
        .entities
        .values()
        .any(|e| e.is_alive() && e.id != actor.id && e.position == dest);
    if occupied {
        return Err(RejectionReason::BlockedCell);
    }
    Ok(())
}

fn validate_attack(world: &WorldState, actor: &Entity, proposal: &ActionProposal) -> Result<(), RejectionReason> {
    let target_id = target_entity_id(proposal).ok_or(RejectionReason::TargetDead)?;
    let target = world
        .entities
        .get(&target_id)
        .filter(|e| e.is_alive())
        .ok_or(RejectionReason::TargetDead)?;
    let range = actor.effective_stat(tickforge_types::StatKind::WeaponRange, f64::from(actor.weapon_range));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let range = range.max(1.0) as u32;
    if actor.position.manhattan_distance(target.position) > range {
        return Err(RejectionReason::OutOfRange);
    }
    Ok(())
}

fn validate_use_skill(
    world: &WorldState,
    actor: &Entity,
    proposal: &ActionProposal,
    ctx: &ActionContext<'_>,
) -> Result<(), RejectionReason> {
    let skill_tag = actor
        .skills
        .first()
        .map(|s| s.skill_tag.as_str())
        .ok_or(RejectionReason::SkillOnCooldown)?;
    let instance = actor
        .skills
        .iter()
        .find(|s| s.skill_tag == skill_tag)
        .ok_or(RejectionReason::SkillOnCooldown)?;
    if instance.cooldown_remaining > 0 {
        return Err(RejectionReason::SkillOnCooldown);
    }
    let definition = ctx
        .skills
        .get(skill_tag)
        .ok_or(RejectionReason::SkillOnCooldown)?;

    let center = match proposal.target {
        ProposalTarget::Position(pos) => pos,
        ProposalTarget::Entity(id) => world
            .entities
            .get(&id)
            .filter(|e| e.is_alive())
            .map(|e| e.position)
            .ok_or(RejectionReason::TargetDead)?,
        _ => return Err(RejectionReason::OutOfRange),
    };
    if actor.position.manhattan_distance(center) > definition.range {
        return Err(RejectionReason::OutOfRange);
    }
    Ok(())
}

fn validate_use_item(actor: &Entity, proposal: &ActionProposal, ctx: &ActionContext<'_>) -> Result<(), RejectionReason> {
    let item_id = match proposal.target {
        ProposalTarget::Item(id) => id,
        _ => return Err(RejectionReason::ItemNotHeld),
    };
    let inventory = actor.inventory.as_ref().ok_or(RejectionReason::ItemNotHeld)?;
    let stack = inventory
        .bag
        .iter()
        .find(|s| s.item_id == item_id)
        .ok_or(RejectionReason::ItemNotHeld)?;
    if ctx.items.get(&stack.item_tag).is_none() {
        return Err(RejectionReason::ItemNotHeld);
    }
    Ok(())
}

fn validate_loot(world: &WorldState, actor: &Entity) -> Result<(), RejectionReason> {
    if world.ground_items.get(&actor.position).is_none_or(Vec::is_empty) {
        return Err(RejectionReason::NothingToLoot);
    }
    Ok(())
}

fn validate_harvest(world: &WorldState, actor: &Entity, proposal: &ActionProposal) -> Result<(), RejectionReason> {
    let node_pos = target_position(proposal).unwrap_or(actor.position);
    let node = world
        .resource_nodes
        .values()
        .find(|n| n.position == node_pos)
        .ok_or(RejectionReason::NothingToHarvest)?;
    if node.remaining == 0 || node.cooldown_remaining > 0 {
        return Err(RejectionReason::NothingToHarvest);
    }
    if !actor.position.is_adjacent_to(node_pos) && actor.position != node_pos {
        return Err(RejectionReason::OutOfRange);
    }
    Ok(())
}
