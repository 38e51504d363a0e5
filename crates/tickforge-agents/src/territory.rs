//! Territory debuff application and alert broadcast (bookkeeping step b).
//!
//! Any entity standing on terrain owned by a hostile faction picks up a
//! refreshed `TerritoryDebuff`, and the owning faction's defenders within
//! alert range switch to `Alert` so they converge on the intrusion.

use std::collections::BTreeMap;

use tickforge_types::{
    AiState, EntityId, EventCategory, EventId, EventRecord, FactionTag, SkillTargetScope, StatKind,
    StatusEffect, StatusEffectKind,
};
use tickforge_world::WorldState;

use crate::config::AgentsConfig;

/// Applies territory debuffs and alert broadcasts, returning the events
/// this produced.
#[must_use]
pub fn apply(world: &mut WorldState, config: &AgentsConfig) -> Vec<EventRecord> {
    let tick = world.tick;
    let intrusions: Vec<(EntityId, FactionTag, tickforge_types::Position)> = world
        .entities
        .values()
        .filter_map(|entity| {
            let tile = world.grid.get(entity.position)?;
            if !world.factions.is_enemy_territory(tile, &entity.faction) {
                return None;
            }
            let owner = world.factions.owner_of_tile(tile)?.clone();
            Some((entity.id, owner, entity.position))
        })
        .collect();

    let mut events = Vec::new();
    for (intruder_id, owner, position) in intrusions {
        refresh_debuff(world, intruder_id, config);
        events.push(EventRecord {
            id: EventId::from_raw(0),
            tick,
            category: EventCategory::Opportunity,
            message: format!("entity {intruder_id} trespasses on {owner} territory"),
        });

        let radius = alert_radius_for(world, position, &owner, config);
        let defenders = broadcast_alert(world, &owner, position, radius);
        for defender_id in defenders {
            events.push(EventRecord {
                id: EventId::from_raw(0),
                tick,
                category: EventCategory::Opportunity,
                message: format!("entity {defender_id} is alerted to the intrusion"),
            });
        }
    }
    events
}

fn refresh_debuff(world: &mut WorldState, id: EntityId, config: &AgentsConfig) {
    let Some(entity) = world.entities.get_mut(&id) else {
        return;
    };
    entity.status_effects.retain(|effect| effect.kind != StatusEffectKind::TerritoryDebuff);

    let mut stat_multipliers = BTreeMap::new();
    stat_multipliers.insert(StatKind::Atk, config.territory_debuff_atk_mult);
    entity.status_effects.push(StatusEffect {
        kind: StatusEffectKind::TerritoryDebuff,
        remaining_ticks: config.territory_debuff_duration,
        hp_per_tick: 0,
        stat_multipliers,
        stat_additive: BTreeMap::new(),
        scope: SkillTargetScope::SelfOrAllyArea,
    });
}

fn alert_radius_for(world: &WorldState, position: tickforge_types::Position, owner: &FactionTag, config: &AgentsConfig) -> u32 {
    world
        .regions
        .iter()
        .find(|region| region.faction == *owner && region.contains(position))
        .map_or(config.default_alert_radius, |region| region.alert_radius)
}

fn broadcast_alert(world: &mut WorldState, owner: &FactionTag, position: tickforge_types::Position, radius: u32) -> Vec<EntityId> {
    let mut alerted = Vec::new();
    for entity in world.entities.values_mut() {
        if entity.is_alive()
            && entity.faction == *owner
            && entity.ai_state.is_decision_state()
            && entity.position.manhattan_distance(position) <= radius
        {
            entity.ai_state = AiState::Alert;
            alerted.push(entity.id);
        }
    }
    alerted
}

#[cfg(test)]
mod tests {
    use super::apply;
    use crate::config::AgentsConfig;
    use tickforge_types::{
        AiState, Entity, EntityId, EntityMemory, FactionTag, Personality, Position, StatBlock,
        ThreatTable, Tile,
    };
    use tickforge_world::{Grid, WorldState};

    fn test_entity(id: u64, faction: &str, pos: Position, ai_state: AiState) -> Entity {
        Entity {
            id: EntityId::from_raw(id),
            kind: "test".into(),
            position: pos,
            faction: FactionTag::new(faction),
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
            ai_state,
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
    fn intruder_on_enemy_territory_gets_debuffed() {
        let mut world = WorldState::new(1, Grid::filled(5, 5, Tile::Town));
        world.factions.set_tile_owner(Tile::Town, FactionTag::new("monsters"));
        world.factions.declare_hostile(FactionTag::new("heroes"), FactionTag::new("monsters"));
        world.insert_entity(test_entity(1, "heroes", Position::new(1, 1), AiState::Wander));
        let config = AgentsConfig::default();

        apply(&mut world, &config);

        let entity = &world.entities[&EntityId::from_raw(1)];
        assert_eq!(entity.status_effects.len(), 1);
    }

    #[test]
    fn defenders_in_range_switch_to_alert() {
        let mut world = WorldState::new(1, Grid::filled(5, 5, Tile::Town));
        world.factions.set_tile_owner(Tile::Town, FactionTag::new("monsters"));
        world.factions.declare_hostile(FactionTag::new("heroes"), FactionTag::new("monsters"));
        world.insert_entity(test_entity(1, "heroes", Position::new(1, 1), AiState::Wander));
        world.insert_entity(test_entity(2, "monsters", Position::new(2, 1), AiState::Idle));
        let config = AgentsConfig::default();

        apply(&mut world, &config);

        let defender = &world.entities[&EntityId::from_raw(2)];
        assert_eq!(defender.ai_state, AiState::Alert);
    }
}
