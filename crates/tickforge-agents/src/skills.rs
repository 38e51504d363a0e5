//! Level-up and skill-cooldown bookkeeping (steps f and g).
//!
//! Level-up rolls stat growth from the same keyed-hash RNG everything
//! else in the simulation draws from, so two runs seeded alike level up
//! identically. Skill cooldowns tick down independently of stamina,
//! which [`crate::vitals`] owns.

use tickforge_rng::{roll_range, Domain};
use tickforge_types::{AiState, EntityId, EventCategory, EventId, EventRecord, StatKind};
use tickforge_world::WorldState;

use crate::config::AgentsConfig;

/// Stats rolled for growth on level-up, in a fixed order so the RNG
/// subkey assigned to each stat is stable across versions.
const GROWTH_STATS: [StatKind; 4] = [StatKind::MaxHp, StatKind::Atk, StatKind::Def, StatKind::Spd];

/// Applies level-up and skill-cooldown ticks to every entity, returning
/// the events this produced.
#[must_use]
pub fn apply(world: &mut WorldState, config: &AgentsConfig) -> Vec<EventRecord> {
    let tick = world.tick;
    let world_seed = world.world_seed;
    let ids: Vec<EntityId> = world.entities.keys().copied().collect();
    let mut events = Vec::new();

    for id in ids {
        apply_level_up(world, id, config, world_seed, tick, &mut events);
        apply_skill_cooldowns(world, id);
    }
    events
}

fn apply_level_up(
    world: &mut WorldState,
    id: EntityId,
    config: &AgentsConfig,
    world_seed: u64,
    tick: u64,
    events: &mut Vec<EventRecord>,
) {
    loop {
        let Some(entity) = world.entities.get(&id) else {
            return;
        };
        if entity.stats.xp < entity.stats.xp_to_next || entity.stats.level >= config.max_level {
            return;
        }

        let new_level = entity.stats.level.saturating_add(1);
        let Some(entity) = world.entities.get_mut(&id) else {
            return;
        };
        entity.stats.xp = entity.stats.xp.saturating_sub(entity.stats.xp_to_next);
        entity.stats.level = new_level;
        entity.stats.xp_to_next = entity.stats.xp_to_next.saturating_add(entity.stats.xp_to_next / 2).max(1);

        for (subkey, stat) in GROWTH_STATS.into_iter().enumerate() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let growth = roll_range(world_seed, Domain::LevelUp, id.get(), tick, subkey as u64, 1, 3) as i64;
            match stat {
                StatKind::MaxHp => entity.stats.max_hp = entity.stats.max_hp.saturating_add(growth),
                StatKind::Atk => entity.stats.atk = entity.stats.atk.saturating_add(growth),
                StatKind::Def => entity.stats.def = entity.stats.def.saturating_add(growth),
                StatKind::Spd => entity.stats.spd = entity.stats.spd.saturating_add(growth),
                _ => {}
            }
        }
        entity.stats.hp = entity.stats.max_hp;

        events.push(EventRecord {
            id: EventId::from_raw(0),
            tick,
            category: EventCategory::LevelUp,
            message: format!("entity {id} reaches level {new_level}"),
        });
    }
}

fn skill_cooldown_rate(state: AiState) -> u32 {
    match state {
        AiState::Combat | AiState::Hunt | AiState::Alert | AiState::Flee => 1,
        _ => 2,
    }
}

fn apply_skill_cooldowns(world: &mut WorldState, id: EntityId) {
    let Some(entity) = world.entities.get_mut(&id) else {
        return;
    };
    let rate = skill_cooldown_rate(entity.ai_state);
    for skill in &mut entity.skills {
        skill.cooldown_remaining = skill.cooldown_remaining.saturating_sub(rate);
    }
}

#[cfg(test)]
mod tests {
    use super::apply;
    use crate::config::AgentsConfig;
    use tickforge_types::{
        AiState, Entity, EntityId, EntityMemory, FactionTag, Personality, Position, SkillInstance,
        StatBlock, ThreatTable, Tile,
    };
    use tickforge_world::{Grid, WorldState};

    fn test_entity(id: u64, xp: u64, xp_to_next: u64, level: u32) -> Entity {
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
                max_hp: 10,
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
                level,
                xp,
                xp_to_next,
                gold: 0,
            },
            class_tag: None,
            skills: vec![SkillInstance { skill_tag: "fireball".into(), cooldown_remaining: 3, mastery: 0, times_used: 0 }],
            status_effects: Vec::new(),
            personality: Personality::default(),
            inventory: None,
            home_storage: None,
            ai_state: AiState::Wander,
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
    fn enough_xp_levels_up_and_resets_hp() {
        let mut world = WorldState::new(7, Grid::filled(5, 5, Tile::Floor));
        world.insert_entity(test_entity(1, 150, 100, 1));
        let config = AgentsConfig::default();

        let events = apply(&mut world, &config);

        let entity = &world.entities[&EntityId::from_raw(1)];
        assert_eq!(entity.stats.level, 2);
        assert_eq!(entity.stats.xp, 50);
        assert_eq!(entity.stats.hp, entity.stats.max_hp);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn level_cap_stops_further_growth() {
        let mut world = WorldState::new(7, Grid::filled(5, 5, Tile::Floor));
        world.insert_entity(test_entity(1, 500, 1, 60));
        let config = AgentsConfig::default();

        apply(&mut world, &config);

        let entity = &world.entities[&EntityId::from_raw(1)];
        assert_eq!(entity.stats.level, 60);
    }

    #[test]
    fn combat_state_ticks_cooldown_slower() {
        let mut world = WorldState::new(7, Grid::filled(5, 5, Tile::Floor));
        let mut entity = test_entity(1, 0, 100, 1);
        entity.ai_state = AiState::Combat;
        world.insert_entity(entity);
        let config = AgentsConfig::default();

        apply(&mut world, &config);

        let entity = &world.entities[&EntityId::from_raw(1)];
        assert_eq!(entity.skills[0].cooldown_remaining, 2);
    }
}
