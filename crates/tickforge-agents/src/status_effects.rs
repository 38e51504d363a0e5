//! Status-effect tick and pruning (bookkeeping step d).
//!
//! Every non-permanent effect counts down by one tick; its `hp_per_tick`
//! (positive or negative) is applied regardless of remaining duration,
//! and effects that just expired are dropped.

use tickforge_types::{EntityId, EventCategory, EventId, EventRecord};
use tickforge_world::WorldState;

/// Ticks every entity's status effects, returning the events this
/// produced.
#[must_use]
pub fn apply(world: &mut WorldState) -> Vec<EventRecord> {
    let tick = world.tick;
    let ids: Vec<EntityId> = world.entities.keys().copied().collect();
    let mut events = Vec::new();

    for id in ids {
        let Some(entity) = world.entities.get_mut(&id) else {
            continue;
        };
        let max_hp = entity.effective_max_hp();
        let mut hp_delta = 0i64;
        for effect in &mut entity.status_effects {
            if !effect.is_permanent() {
                effect.remaining_ticks = effect.remaining_ticks.saturating_sub(1);
            }
            hp_delta = hp_delta.saturating_add(effect.hp_per_tick);
        }
        if hp_delta != 0 {
            entity.stats.hp = entity.stats.hp.saturating_add(hp_delta).clamp(0, max_hp);
        }
        let expired = entity.status_effects.iter().filter(|e| !e.is_permanent() && e.remaining_ticks <= 0).count();
        entity.status_effects.retain(|e| e.is_permanent() || e.remaining_ticks > 0);
        if expired > 0 {
            events.push(EventRecord {
                id: EventId::from_raw(0),
                tick,
                category: EventCategory::Opportunity,
                message: format!("entity {id} sheds {expired} expired status effect(s)"),
            });
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::apply;
    use std::collections::BTreeMap;
    use tickforge_types::{
        AiState, Entity, EntityId, EntityMemory, FactionTag, Personality, Position, SkillTargetScope,
        StatBlock, StatusEffect, StatusEffectKind, ThreatTable, Tile,
    };
    use tickforge_world::{Grid, WorldState};

    fn test_entity(id: u64) -> Entity {
        Entity {
            id: EntityId::from_raw(id),
            kind: "test".into(),
            position: Position::new(1, 1),
            faction: FactionTag::new("heroes"),
            tier: 0,
            alive: true,
            is_hero: false,
            stats: StatBlock {
                hp: 10,
                max_hp: 20,
                atk: 5,
                def: 2,
                spd: 1,
                luck: 0,
                crit_rate: 0.0,
                crit_dmg: 1.5,
                evasion: 0.0,
                matk: 0,
                mdef: 0,
                stamina: 5,
                max_stamina: 10,
                level: 1,
                xp: 0,
                xp_to_next: 100,
                gold: 0,
            },
            class_tag: None,
            skills: Vec::new(),
            status_effects: Vec::new(),
            personality: Personality::default(),
            inventory: None,
            home_storage: None,
            ai_state: AiState::Idle,
            next_act_at: 0.0,
            memory: EntityMemory::default(),
            engaged_ticks: 0,
            threat_table: ThreatTable::default(),
            cached_path: None,
            cached_path_target: None,
            combat_target_id: None,
            loot_progress: 0,
            loot_duration: 3,
            home_pos: Position::new(0, 0),
            vision_range: 8,
            weapon_range: 1,
            leash_radius: None,
        }
    }

    #[test]
    fn expired_effect_is_pruned_and_damage_applied() {
        let mut world = WorldState::new(1, Grid::filled(5, 5, Tile::Floor));
        let mut entity = test_entity(1);
        entity.status_effects.push(StatusEffect {
            kind: StatusEffectKind::TerritoryDebuff,
            remaining_ticks: 1,
            hp_per_tick: -2,
            stat_multipliers: BTreeMap::new(),
            stat_additive: BTreeMap::new(),
            scope: SkillTargetScope::SelfOrAllyArea,
        });
        world.insert_entity(entity);

        let events = apply(&mut world);

        let entity = &world.entities[&EntityId::from_raw(1)];
        assert!(entity.status_effects.is_empty());
        assert_eq!(entity.stats.hp, 8);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn permanent_effect_is_never_decremented_or_pruned() {
        let mut world = WorldState::new(1, Grid::filled(5, 5, Tile::Floor));
        let mut entity = test_entity(1);
        entity.status_effects.push(StatusEffect {
            kind: StatusEffectKind::Named("blessing".into()),
            remaining_ticks: -1,
            hp_per_tick: 0,
            stat_multipliers: BTreeMap::new(),
            stat_additive: BTreeMap::new(),
            scope: SkillTargetScope::SelfOrAllyArea,
        });
        world.insert_entity(entity);

        apply(&mut world);

        let entity = &world.entities[&EntityId::from_raw(1)];
        assert_eq!(entity.status_effects.len(), 1);
        assert_eq!(entity.status_effects[0].remaining_ticks, -1);
    }
}
