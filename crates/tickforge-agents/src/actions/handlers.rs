//! Per-verb execution. Every function here assumes its proposal has
//! already passed [`crate::actions::validation::validate`] against the
//! current world state; none of them re-check feasibility.

use tickforge_types::{
    ActionProposal, ActionVerb, EntityId, EventCategory, EventRecord, ItemStack, Position,
    ProposalTarget, SkillTargetScope, StatusEffect, StatusEffectKind,
};
use tickforge_world::WorldState;

use super::combat::{opportunity_attack_damage, resolve_attack, resolve_skill_hit};
use super::costs::{self, move_tick_cost};
use super::ActionContext;

/// Applies one already-validated proposal to `world`, returning the
/// events it produced. The caller (the resolver) is responsible for
/// tracking claimed destination cells across a tick's worth of `Move`s.
pub fn apply(world: &mut WorldState, proposal: &ActionProposal, ctx: &ActionContext<'_>, tick: u64) -> Vec<EventRecord> {
    match proposal.verb {
        ActionVerb::Rest => apply_rest(world, proposal.actor_id),
        ActionVerb::Move => apply_move(world, proposal, ctx, tick),
        ActionVerb::Attack => apply_attack(world, proposal, ctx, tick),
        ActionVerb::UseSkill => apply_use_skill(world, proposal, ctx, tick),
        ActionVerb::UseItem => apply_use_item(world, proposal, ctx),
        ActionVerb::Loot => apply_loot(world, proposal, ctx),
        ActionVerb::Harvest => apply_harvest(world, proposal, ctx),
    }
}

fn apply_rest(world: &mut WorldState, actor_id: EntityId) -> Vec<EventRecord> {
    let tick = world.tick;
    let Some(actor) = world.entities.get_mut(&actor_id) else {
        return Vec::new();
    };
    actor.next_act_at += costs::base_tick_cost(ActionVerb::Rest);
    vec![EventRecord {
        id: tickforge_types::EventId::from_raw(0),
        tick,
        category: EventCategory::Rest,
        message: format!("entity {actor_id} rests"),
    }]
}

fn adjacent_hostiles(world: &WorldState, actor_id: EntityId) -> Vec<EntityId> {
    let Some(actor) = world.entities.get(&actor_id) else {
        return Vec::new();
    };
    world
        .entities
        .values()
        .filter(|other| {
            other.is_alive()
                && other.id != actor_id
                && other.position.is_adjacent_to(actor.position)
                && world.factions.are_hostile(&other.faction, &actor.faction)
        })
        .map(|other| other.id)
        .collect()
}

fn apply_move(world: &mut WorldState, proposal: &ActionProposal, ctx: &ActionContext<'_>, tick: u64) -> Vec<EventRecord> {
    let ProposalTarget::Position(dest) = proposal.target else {
        return apply_rest(world, proposal.actor_id);
    };
    let actor_id = proposal.actor_id;
    let mut events = Vec::new();

    let engaged = world
        .entities
        .get(&actor_id)
        .is_some_and(|e| e.engaged_ticks >= ctx.config.engagement_lock_ticks);
    if engaged {
        for attacker_id in adjacent_hostiles(world, actor_id) {
            let (Some(attacker), Some(defender)) = (
                world.entities.get(&attacker_id).cloned(),
                world.entities.get(&actor_id).cloned(),
            ) else {
                continue;
            };
            let damage = opportunity_attack_damage(&attacker, &defender);
            if let Some(defender) = world.entities.get_mut(&actor_id) {
                defender.stats.hp = defender.stats.hp.saturating_sub(damage).max(0);
            }
            events.push(EventRecord {
                id: tickforge_types::EventId::from_raw(0),
                tick,
                category: EventCategory::Opportunity,
                message: format!("entity {attacker_id} gets an opportunity attack on {actor_id} for {damage}"),
            });
        }
    }

    let Some(actor) = world.entities.get(&actor_id) else {
        return events;
    };
    let cost = move_tick_cost(actor, &world.grid, dest, ctx.config.engagement_lock_ticks);
    let stamina_cost = costs::stamina_cost(ActionVerb::Move);

    if let Some(actor) = world.entities.get_mut(&actor_id) {
        actor.position = dest;
        actor.next_act_at += cost;
        actor.stats.stamina = actor.stats.stamina.saturating_sub(stamina_cost).max(0);
    }

    events.push(EventRecord {
        id: tickforge_types::EventId::from_raw(0),
        tick,
        category: EventCategory::Movement,
        message: format!("entity {actor_id} moves to ({}, {})", dest.x, dest.y),
    });
    events
}

#[allow(clippy::cast_precision_loss)]
fn apply_attack(world: &mut WorldState, proposal: &ActionProposal, ctx: &ActionContext<'_>, tick: u64) -> Vec<EventRecord> {
    let actor_id = proposal.actor_id;
    let ProposalTarget::Entity(target_id) = proposal.target else {
        return Vec::new();
    };
    let (Some(attacker), Some(defender)) = (
        world.entities.get(&actor_id).cloned(),
        world.entities.get(&target_id).cloned(),
    ) else {
        return Vec::new();
    };

    let outcome = resolve_attack(&attacker, &defender, world.world_seed, tick, ctx.config);

    if let Some(actor) = world.entities.get_mut(&actor_id) {
        actor.next_act_at += costs::base_tick_cost(ActionVerb::Attack);
        actor.stats.stamina = actor.stats.stamina.saturating_sub(costs::stamina_cost(ActionVerb::Attack)).max(0);
    }

    if outcome.evaded {
        return vec![EventRecord {
            id: tickforge_types::EventId::from_raw(0),
            tick,
            category: EventCategory::Combat,
            message: format!("entity {target_id} evades {actor_id}'s attack"),
        }];
    }

    if let Some(target) = world.entities.get_mut(&target_id) {
        target.stats.hp = target.stats.hp.saturating_sub(outcome.damage).max(0);
        target.threat_table.add(actor_id, outcome.damage as f64);
    }

    vec![EventRecord {
        id: tickforge_types::EventId::from_raw(0),
        tick,
        category: EventCategory::Attack,
        message: format!(
            "entity {actor_id} hits {target_id} for {}{}",
            outcome.damage,
            if outcome.crit { " (crit)" } else { "" }
        ),
    }]
}

fn skill_center(world: &WorldState, proposal: &ActionProposal) -> Option<Position> {
    match proposal.target {
        ProposalTarget::Position(pos) => Some(pos),
        ProposalTarget::Entity(id) => world.entities.get(&id).map(|e| e.position),
        ProposalTarget::None | ProposalTarget::Item(_) => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn apply_use_skill(world: &mut WorldState, proposal: &ActionProposal, ctx: &ActionContext<'_>, tick: u64) -> Vec<EventRecord> {
    let actor_id = proposal.actor_id;
    let Some(center) = skill_center(world, proposal) else {
        return Vec::new();
    };
    let Some(actor) = world.entities.get(&actor_id).cloned() else {
        return Vec::new();
    };
    let Some(skill_tag) = actor.skills.first().map(|s| s.skill_tag.clone()) else {
        return Vec::new();
    };
    let Some(definition) = ctx.skills.get(&skill_tag).cloned() else {
        return Vec::new();
    };

    let primary_target = match proposal.target {
        ProposalTarget::Entity(id) => Some(id),
        _ => None,
    };

    let mut affected: Vec<(EntityId, u32)> = world
        .entities
        .values()
        .filter(|e| e.is_alive())
        .filter_map(|e| {
            let distance = e.position.manhattan_distance(center);
            (distance <= definition.radius).then_some((e.id, distance))
        })
        .collect();
    affected.sort_by_key(|(_, d)| *d);

    let mut events = Vec::new();
    let mut subkey = 10u64;
    for (target_id, distance) in affected {
        let Some(defender) = world.entities.get(&target_id).cloned() else {
            continue;
        };
        let is_hostile = world.factions.are_hostile(&defender.faction, &actor.faction);
        let wants_hostile = matches!(definition.scope, SkillTargetScope::EnemyOrEnemyArea);
        if is_hostile != wants_hostile {
            continue;
        }
        let is_center = Some(target_id) == primary_target || distance == 0;

        if wants_hostile {
            let outcome = resolve_skill_hit(&actor, &defender, &definition, distance, is_center, world.world_seed, tick, subkey);
            subkey += 2;
            if let Some(target) = world.entities.get_mut(&target_id) {
                target.stats.hp = target.stats.hp.saturating_sub(outcome.damage).max(0);
                target.threat_table.add(actor_id, outcome.damage as f64);
            }
            events.push(EventRecord {
                id: tickforge_types::EventId::from_raw(0),
                tick,
                category: EventCategory::Skill,
                message: format!("entity {actor_id} hits {target_id} with {skill_tag} for {}", outcome.damage),
            });
        } else if definition.effect_duration != 0 {
            if let Some(target) = world.entities.get_mut(&target_id) {
                target.status_effects.push(StatusEffect {
                    kind: StatusEffectKind::Named(skill_tag.clone()),
                    remaining_ticks: definition.effect_duration,
                    hp_per_tick: 0,
                    stat_multipliers: definition.stat_multipliers.clone(),
                    stat_additive: definition.stat_additive.clone(),
                    scope: definition.scope,
                });
            }
            events.push(EventRecord {
                id: tickforge_types::EventId::from_raw(0),
                tick,
                category: EventCategory::Skill,
                message: format!("entity {actor_id} casts {skill_tag} on {target_id}"),
            });
        }
    }

    if let Some(actor) = world.entities.get_mut(&actor_id) {
        actor.next_act_at += costs::base_tick_cost(ActionVerb::UseSkill);
        actor.stats.stamina = actor.stats.stamina.saturating_sub(definition.stamina_cost).max(0);
        if let Some(instance) = actor.skills.iter_mut().find(|s| s.skill_tag == skill_tag) {
            instance.cooldown_remaining = definition.base_cooldown.saturating_sub(instance.mastery / 10);
            instance.times_used = instance.times_used.saturating_add(1);
            instance.mastery = instance.mastery.saturating_add(1);
        }
    }

    events
}

fn apply_use_item(world: &mut WorldState, proposal: &ActionProposal, ctx: &ActionContext<'_>) -> Vec<EventRecord> {
    let actor_id = proposal.actor_id;
    let tick = world.tick;
    let ProposalTarget::Item(item_id) = proposal.target else {
        return Vec::new();
    };
    let Some(actor) = world.entities.get_mut(&actor_id) else {
        return Vec::new();
    };
    let Some(inventory) = actor.inventory.as_mut() else {
        return Vec::new();
    };
    let Some(slot) = inventory.bag.iter().position(|s| s.item_id == item_id) else {
        return Vec::new();
    };
    let Some(tag) = inventory.bag.get(slot).map(|s| s.item_tag.clone()) else {
        return Vec::new();
    };
    let Some(definition) = ctx.items.get(&tag).cloned() else {
        return Vec::new();
    };

    let still_stacked = inventory.bag.get_mut(slot).is_some_and(|stack| {
        if stack.quantity > 1 {
            stack.quantity = stack.quantity.saturating_sub(1);
            true
        } else {
            false
        }
    });
    if !still_stacked {
        inventory.bag.remove(slot);
    }

    let mut messages = Vec::new();
    if definition.heal_amount != 0 {
        let max_hp = actor.effective_max_hp();
        actor.stats.hp = actor.stats.hp.saturating_add(definition.heal_amount).min(max_hp).max(0);
        messages.push(format!("entity {actor_id} uses {tag}, healing {}", definition.heal_amount));
    } else {
        messages.push(format!("entity {actor_id} uses {tag}"));
    }
    actor.next_act_at += costs::base_tick_cost(ActionVerb::UseItem);

    messages
        .into_iter()
        .map(|message| EventRecord {
            id: tickforge_types::EventId::from_raw(0),
            tick,
            category: EventCategory::UseItem,
            message,
        })
        .collect()
}

fn apply_loot(world: &mut WorldState, proposal: &ActionProposal, ctx: &ActionContext<'_>) -> Vec<EventRecord> {
    let actor_id = proposal.actor_id;
    let tick = world.tick;
    let Some(position) = world.entities.get(&actor_id).map(|e| e.position) else {
        return Vec::new();
    };
    let ground = world.ground_items.remove(&position).unwrap_or_default();
    if ground.is_empty() {
        return Vec::new();
    }

    let mut overflow = Vec::new();
    let mut events = Vec::new();

    for stack in ground {
        let Some(actor) = world.entities.get_mut(&actor_id) else {
            overflow.push(stack);
            continue;
        };
        let Some(inventory) = actor.inventory.as_mut() else {
            overflow.push(stack);
            continue;
        };
        let Some(definition) = ctx.items.get(&stack.item_tag).cloned() else {
            if inventory.has_space() {
                inventory.bag.push(stack);
            } else {
                overflow.push(stack);
            }
            continue;
        };

        if let Some(equip_slot) = definition.equip_slot {
            let should_equip = inventory
                .equipment
                .get(&equip_slot)
                .and_then(|current| ctx.items.get(&current.item_tag))
                .is_none_or(|current| definition.power > current.power);
            if should_equip {
                let previous = inventory.equipment.insert(equip_slot, stack);
                if let Some(previous) = previous {
                    if inventory.has_space() {
                        inventory.bag.push(previous);
                    } else {
                        overflow.push(previous);
                    }
                }
                events.push(EventRecord {
                    id: tickforge_types::EventId::from_raw(0),
                    tick,
                    category: EventCategory::Loot,
                    message: format!("entity {actor_id} equips {equip_slot:?}"),
                });
                continue;
            }
        }

        if inventory.has_space() {
            let message = format!("entity {actor_id} loots {} x{}", stack.item_tag, stack.quantity);
            inventory.bag.push(stack);
            events.push(EventRecord {
                id: tickforge_types::EventId::from_raw(0),
                tick,
                category: EventCategory::Loot,
                message,
            });
        } else {
            overflow.push(stack);
        }
    }

    if !overflow.is_empty() {
        world.drop_items_at(position, overflow);
    }
    if let Some(actor) = world.entities.get_mut(&actor_id) {
        actor.next_act_at += costs::base_tick_cost(ActionVerb::Loot);
    }
    events
}

fn apply_harvest(world: &mut WorldState, proposal: &ActionProposal, ctx: &ActionContext<'_>) -> Vec<EventRecord> {
    let actor_id = proposal.actor_id;
    let tick = world.tick;
    let Some(actor_position) = world.entities.get(&actor_id).map(|e| e.position) else {
        return Vec::new();
    };
    let target_position = match proposal.target {
        ProposalTarget::Position(pos) => pos,
        _ => actor_position,
    };
    let Some(node_id) = world
        .resource_nodes
        .values()
        .find(|n| n.position == target_position)
        .map(|n| n.id)
    else {
        return Vec::new();
    };

    let yield_tag = {
        let Some(node) = world.resource_nodes.get_mut(&node_id) else {
            return Vec::new();
        };
        node.remaining = node.remaining.saturating_sub(1);
        if node.remaining == 0 {
            node.cooldown_remaining = node.respawn_cooldown;
        }
        node.yield_item_tag.clone()
    };

    let item_id = world.alloc_item_id();
    let stack = ItemStack {
        item_id,
        item_tag: yield_tag.clone(),
        quantity: 1,
    };

    let mut events = Vec::new();
    if let Some(actor) = world.entities.get_mut(&actor_id) {
        actor.next_act_at += costs::base_tick_cost(ActionVerb::Harvest);
        actor.stats.stamina = actor.stats.stamina.saturating_sub(costs::stamina_cost(ActionVerb::Harvest)).max(0);
        let has_space = actor.inventory.as_ref().is_some_and(|inv| inv.has_space());
        if has_space {
            if let Some(inventory) = actor.inventory.as_mut() {
                inventory.bag.push(stack);
            }
            events.push(EventRecord {
                id: tickforge_types::EventId::from_raw(0),
                tick,
                category: EventCategory::Harvest,
                message: format!("entity {actor_id} harvests {yield_tag}"),
            });
        } else {
            world.drop_items_at(actor_position, vec![stack]);
        }
    }
    // `ctx` is only needed by handlers whose yield depends on registry content;
    // harvest yields are fixed by the node itself, so the binding exists to
    // keep this handler's signature uniform with the others.
    let _ = ctx;
    events
}
