//! One handler per `AiState`, each pure with respect to the snapshot:
//! given the actor, this tick's perception, and the snapshot it was
//! built from, produce the proposal the resolver should validate.
//!
//! Handlers never touch `WorldState` and never mutate the `Entity` they
//! were handed — any state change rides back on the proposal's
//! `new_ai_state` field for the resolver to apply.

use tickforge_types::{
    ActionProposal, ActionVerb, AiState, BuildingKind, Entity, ItemId, Position, ProposalTarget,
    StatKind,
};
use tickforge_world::{Perception, Snapshot};

use super::pathing;
use super::BrainContext;
use crate::config::AgentsConfig;
use crate::registries::{ItemRegistry, SkillRegistry};

/// Dispatches to the handler registered for `state`.
#[must_use]
pub fn handle(state: AiState, actor: &Entity, view: &Perception, snapshot: &Snapshot, ctx: &BrainContext<'_>) -> ActionProposal {
    match state {
        AiState::Idle => rest_with(actor, AiState::Idle),
        AiState::Wander => handle_wander(actor, view, snapshot, ctx.config),
        AiState::RestingInTown => handle_resting_in_town(actor),
        AiState::GuardCamp => handle_guard_camp(actor, view, snapshot),
        AiState::Hunt => handle_hunt(actor, view, snapshot, ctx.config),
        AiState::Combat => handle_combat(actor, view, snapshot, ctx),
        AiState::Flee => handle_flee(actor, view, snapshot),
        AiState::Looting => handle_looting(actor, view, snapshot, ctx.config),
        AiState::Alert => handle_alert(actor, view, snapshot),
        AiState::Harvesting => handle_harvesting(actor, view, snapshot, ctx.config),
        AiState::ReturnToTown => handle_return_to_town(actor, snapshot),
        AiState::ReturnToCamp => handle_return_to_camp(actor, snapshot),
        AiState::VisitShop => handle_visit(actor, snapshot, BuildingKind::Shop, AiState::VisitShop),
        AiState::VisitBlacksmith => handle_visit(actor, snapshot, BuildingKind::Blacksmith, AiState::VisitBlacksmith),
        AiState::VisitGuild => handle_visit(actor, snapshot, BuildingKind::Guild, AiState::VisitGuild),
        AiState::VisitClassHall => handle_visit(actor, snapshot, BuildingKind::ClassHall, AiState::VisitClassHall),
        AiState::VisitInn => handle_visit(actor, snapshot, BuildingKind::Inn, AiState::VisitInn),
        AiState::VisitHome => handle_visit(actor, snapshot, BuildingKind::Home, AiState::VisitHome),
    }
}

fn rest_with(actor: &Entity, next: AiState) -> ActionProposal {
    ActionProposal {
        actor_id: actor.id,
        verb: ActionVerb::Rest,
        target: ProposalTarget::None,
        new_ai_state: Some(next),
    }
}

fn move_or_rest(actor: &Entity, destination: Position, snapshot: &Snapshot, stay: AiState) -> ActionProposal {
    match pathing::step_towards(snapshot.grid(), actor.position, destination) {
        Some(step) => ActionProposal {
            actor_id: actor.id,
            verb: ActionVerb::Move,
            target: ProposalTarget::Position(step),
            new_ai_state: Some(stay),
        },
        None => rest_with(actor, stay),
    }
}

/// Heroes fall back toward town; everyone else falls back toward camp.
fn home_return_state(actor: &Entity) -> AiState {
    if actor.is_hero {
        AiState::ReturnToTown
    } else {
        AiState::ReturnToCamp
    }
}

fn is_diagonal_at_distance_two(a: Position, b: Position) -> bool {
    (a.x - b.x).abs() == 1 && (a.y - b.y).abs() == 1
}

fn weapon_range(actor: &Entity) -> f64 {
    actor.effective_stat(StatKind::WeaponRange, f64::from(actor.weapon_range)).max(1.0)
}

fn handle_wander(actor: &Entity, view: &Perception, snapshot: &Snapshot, config: &AgentsConfig) -> ActionProposal {
    if view.nearest_enemy.is_some() && actor.hp_ratio() > config.flee_hp_ratio {
        return rest_with(actor, AiState::Hunt);
    }
    let has_space = actor.inventory.as_ref().is_some_and(tickforge_types::Inventory::has_space);
    if !view.ground_loot_nearby.is_empty() && has_space {
        return rest_with(actor, AiState::Looting);
    }
    if let Some(leash) = actor.leash_radius {
        if actor.position.manhattan_distance(actor.home_pos) > leash {
            return move_or_rest(actor, actor.home_pos, snapshot, AiState::Wander);
        }
    }
    match view.frontier_target {
        Some(target) => move_or_rest(actor, target, snapshot, AiState::Wander),
        None => rest_with(actor, AiState::Wander),
    }
}

/// Rest until at full effective hp, then pick the next building to visit
/// in fixed priority: sell/buy share the shop, otherwise craft, otherwise
/// socialize, otherwise go back to wandering. The transactions themselves
/// (what gets bought, sold, crafted, or learned) are opaque content this
/// engine doesn't model; only the navigation and state transition are.
fn handle_resting_in_town(actor: &Entity) -> ActionProposal {
    if actor.stats.hp < actor.effective_max_hp() {
        return rest_with(actor, AiState::RestingInTown);
    }
    let has_sellable = actor.inventory.as_ref().is_some_and(|inv| !inv.bag.is_empty());
    if has_sellable {
        return rest_with(actor, AiState::VisitShop);
    }
    if !actor.skills.is_empty() {
        return rest_with(actor, AiState::VisitBlacksmith);
    }
    if actor.personality.sociability > 0.0 {
        return rest_with(actor, AiState::VisitGuild);
    }
    rest_with(actor, AiState::Wander)
}

fn handle_guard_camp(actor: &Entity, view: &Perception, snapshot: &Snapshot) -> ActionProposal {
    if view.nearest_enemy.is_some() && view.on_home_territory {
        return rest_with(actor, AiState::Alert);
    }
    if actor.position == actor.home_pos {
        return rest_with(actor, AiState::GuardCamp);
    }
    move_or_rest(actor, actor.home_pos, snapshot, AiState::GuardCamp)
}

fn handle_hunt(actor: &Entity, view: &Perception, snapshot: &Snapshot, config: &AgentsConfig) -> ActionProposal {
    let Some(target_id) = view.highest_threat_enemy.or(view.nearest_enemy) else {
        return rest_with(actor, home_return_state(actor));
    };
    let Some(target) = snapshot.entity(target_id) else {
        return rest_with(actor, home_return_state(actor));
    };
    let distance = actor.position.manhattan_distance(target.position);
    if f64::from(distance) <= weapon_range(actor) {
        return ActionProposal {
            actor_id: actor.id,
            verb: ActionVerb::Attack,
            target: ProposalTarget::Entity(target_id),
            new_ai_state: Some(AiState::Combat),
        };
    }
    if actor.engaged_ticks >= config.mob_chase_give_up_ticks {
        return rest_with(actor, home_return_state(actor));
    }
    if distance == 2 && target.ai_state == AiState::Hunt && actor.id > target.id && is_diagonal_at_distance_two(actor.position, target.position) {
        return rest_with(actor, AiState::Hunt);
    }
    move_or_rest(actor, target.position, snapshot, AiState::Hunt)
}

fn best_potion(actor: &Entity, items: &ItemRegistry) -> Option<ItemId> {
    actor
        .inventory
        .as_ref()?
        .bag
        .iter()
        .filter_map(|stack| items.get(&stack.item_tag).map(|def| (stack.item_id, def.heal_amount)))
        .filter(|(_, heal)| *heal > 0)
        .max_by_key(|(_, heal)| *heal)
        .map(|(id, _)| id)
}

fn count_hostiles_within(actor: &Entity, view: &Perception, snapshot: &Snapshot, radius: u32) -> u32 {
    let count = view
        .visible_entities
        .iter()
        .filter_map(|id| snapshot.entity(*id))
        .filter(|e| snapshot.factions().are_hostile(&e.faction, &actor.faction))
        .filter(|e| actor.position.manhattan_distance(e.position) <= radius)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[allow(clippy::cast_precision_loss)]
fn skill_beats_attack(actor: &Entity, view: &Perception, snapshot: &Snapshot, skills: &SkillRegistry, config: &AgentsConfig) -> bool {
    let Some(instance) = actor.skills.first() else {
        return false;
    };
    if instance.cooldown_remaining > 0 {
        return false;
    }
    let Some(definition) = skills.get(&instance.skill_tag) else {
        return false;
    };
    let hit_count = count_hostiles_within(actor, view, snapshot, definition.radius.max(1)).max(1);
    let skill_value = definition.power * f64::from(hit_count);
    let attack_value = actor.effective_stat(StatKind::Atk, actor.stats.atk as f64);
    skill_value > attack_value * config.skill_over_attack_margin
}

fn kite_step(actor: &Entity, target: &Entity, snapshot: &Snapshot) -> Option<Position> {
    pathing::walkable_neighbors(snapshot.grid(), actor.position)
        .into_iter()
        .max_by_key(|pos| pos.manhattan_distance(target.position))
}

fn handle_combat(actor: &Entity, view: &Perception, snapshot: &Snapshot, ctx: &BrainContext<'_>) -> ActionProposal {
    if actor.hp_ratio() < ctx.config.flee_hp_ratio {
        return rest_with(actor, AiState::Flee);
    }
    let Some(target_id) = view.highest_threat_enemy.or(view.nearest_enemy) else {
        return rest_with(actor, home_return_state(actor));
    };
    let Some(target) = snapshot.entity(target_id) else {
        return rest_with(actor, home_return_state(actor));
    };

    if actor.hp_ratio() < 0.5 {
        if let Some(item_id) = best_potion(actor, ctx.items) {
            return ActionProposal {
                actor_id: actor.id,
                verb: ActionVerb::UseItem,
                target: ProposalTarget::Item(item_id),
                new_ai_state: Some(AiState::Combat),
            };
        }
    }

    let distance = actor.position.manhattan_distance(target.position);
    let range = weapon_range(actor);
    if f64::from(distance) > range {
        return move_or_rest(actor, target.position, snapshot, AiState::Combat);
    }

    if range >= 3.0 && actor.hp_ratio() > 0.6 && distance <= 1 {
        if let Some(step) = kite_step(actor, target, snapshot) {
            return ActionProposal {
                actor_id: actor.id,
                verb: ActionVerb::Move,
                target: ProposalTarget::Position(step),
                new_ai_state: Some(AiState::Combat),
            };
        }
    }

    if skill_beats_attack(actor, view, snapshot, ctx.skills, ctx.config) {
        return ActionProposal {
            actor_id: actor.id,
            verb: ActionVerb::UseSkill,
            target: ProposalTarget::Entity(target_id),
            new_ai_state: Some(AiState::Combat),
        };
    }

    ActionProposal {
        actor_id: actor.id,
        verb: ActionVerb::Attack,
        target: ProposalTarget::Entity(target_id),
        new_ai_state: Some(AiState::Combat),
    }
}

fn handle_flee(actor: &Entity, view: &Perception, snapshot: &Snapshot) -> ActionProposal {
    if view.nearest_enemy.is_none() {
        return rest_with(actor, home_return_state(actor));
    }
    let destination = if actor.is_hero {
        actor.home_pos
    } else {
        view.nearest_camp.unwrap_or(actor.home_pos)
    };
    let hostiles: Vec<Position> = view
        .visible_entities
        .iter()
        .filter_map(|id| snapshot.entity(*id))
        .filter(|e| snapshot.factions().are_hostile(&e.faction, &actor.faction))
        .map(|e| e.position)
        .collect();

    let best = pathing::walkable_neighbors(snapshot.grid(), actor.position)
        .into_iter()
        .max_by_key(|pos| {
            let min_hostile_dist = hostiles.iter().map(|h| pos.manhattan_distance(*h)).min().unwrap_or(u32::MAX);
            let dest_dist = pos.manhattan_distance(destination);
            (min_hostile_dist, u32::MAX.saturating_sub(dest_dist))
        });

    match best {
        Some(step) => ActionProposal {
            actor_id: actor.id,
            verb: ActionVerb::Move,
            target: ProposalTarget::Position(step),
            new_ai_state: Some(AiState::Flee),
        },
        None => rest_with(actor, AiState::Flee),
    }
}

fn hostile_within(actor: &Entity, view: &Perception, snapshot: &Snapshot, radius: u32) -> bool {
    view.nearest_enemy
        .and_then(|id| snapshot.entity(id))
        .is_some_and(|e| actor.position.manhattan_distance(e.position) <= radius)
}

fn handle_looting(actor: &Entity, view: &Perception, snapshot: &Snapshot, config: &AgentsConfig) -> ActionProposal {
    if hostile_within(actor, view, snapshot, 3) {
        return rest_with(actor, if actor.hp_ratio() < config.flee_hp_ratio { AiState::Flee } else { AiState::Hunt });
    }
    if actor.hp_ratio() < config.flee_hp_ratio {
        return rest_with(actor, AiState::Flee);
    }
    let Some(&target) = view.ground_loot_nearby.first() else {
        return rest_with(actor, AiState::Wander);
    };
    if actor.position == target {
        if actor.loot_progress >= actor.loot_duration {
            return ActionProposal {
                actor_id: actor.id,
                verb: ActionVerb::Loot,
                target: ProposalTarget::None,
                new_ai_state: Some(AiState::Wander),
            };
        }
        return rest_with(actor, AiState::Looting);
    }
    move_or_rest(actor, target, snapshot, AiState::Looting)
}

fn handle_harvesting(actor: &Entity, view: &Perception, snapshot: &Snapshot, config: &AgentsConfig) -> ActionProposal {
    if hostile_within(actor, view, snapshot, 3) {
        return rest_with(actor, if actor.hp_ratio() < config.flee_hp_ratio { AiState::Flee } else { AiState::Hunt });
    }
    if actor.hp_ratio() < config.flee_hp_ratio {
        return rest_with(actor, AiState::Flee);
    }
    let Some(node) = snapshot
        .resource_nodes()
        .filter(|n| n.remaining > 0 && n.cooldown_remaining == 0)
        .filter(|n| actor.position.manhattan_distance(n.position) <= actor.vision_range)
        .min_by_key(|n| actor.position.manhattan_distance(n.position))
    else {
        return rest_with(actor, AiState::Wander);
    };
    let at_node = actor.position == node.position || actor.position.is_adjacent_to(node.position);
    if at_node {
        if actor.loot_progress >= actor.loot_duration {
            return ActionProposal {
                actor_id: actor.id,
                verb: ActionVerb::Harvest,
                target: ProposalTarget::Position(node.position),
                new_ai_state: Some(AiState::Wander),
            };
        }
        return rest_with(actor, AiState::Harvesting);
    }
    move_or_rest(actor, node.position, snapshot, AiState::Harvesting)
}

fn handle_return_to_town(actor: &Entity, snapshot: &Snapshot) -> ActionProposal {
    if actor.position == actor.home_pos {
        return rest_with(actor, AiState::RestingInTown);
    }
    move_or_rest(actor, actor.home_pos, snapshot, AiState::ReturnToTown)
}

fn handle_return_to_camp(actor: &Entity, snapshot: &Snapshot) -> ActionProposal {
    if actor.position == actor.home_pos {
        return rest_with(actor, AiState::GuardCamp);
    }
    move_or_rest(actor, actor.home_pos, snapshot, AiState::ReturnToCamp)
}

/// Walks to the nearest non-hostile building of `kind`; once adjacent,
/// the visit "completes" (the transaction itself is opaque content this
/// engine doesn't model) and the actor returns to `Wander`.
fn handle_visit(actor: &Entity, snapshot: &Snapshot, kind: BuildingKind, in_transit: AiState) -> ActionProposal {
    let Some(building) = snapshot
        .buildings()
        .iter()
        .filter(|b| b.kind == kind && !snapshot.factions().are_hostile(&b.faction, &actor.faction))
        .min_by_key(|b| actor.position.manhattan_distance(b.position))
    else {
        return rest_with(actor, AiState::Wander);
    };
    if actor.position == building.position || actor.position.is_adjacent_to(building.position) {
        return rest_with(actor, AiState::Wander);
    }
    move_or_rest(actor, building.position, snapshot, in_transit)
}

fn handle_alert(actor: &Entity, view: &Perception, snapshot: &Snapshot) -> ActionProposal {
    let Some(target_id) = view.nearest_enemy else {
        return rest_with(actor, AiState::GuardCamp);
    };
    let Some(target) = snapshot.entity(target_id) else {
        return rest_with(actor, AiState::GuardCamp);
    };
    let distance = actor.position.manhattan_distance(target.position);
    if f64::from(distance) <= weapon_range(actor) {
        return ActionProposal {
            actor_id: actor.id,
            verb: ActionVerb::Attack,
            target: ProposalTarget::Entity(target_id),
            new_ai_state: Some(AiState::Alert),
        };
    }
    move_or_rest(actor, target.position, snapshot, AiState::Alert)
}
