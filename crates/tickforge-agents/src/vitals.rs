//! Town aura, passive/resting heal, and stamina regen (bookkeeping
//! steps a and the stamina half of g).
//!
//! Applied in a fixed order per entity each tick: aura damage to
//! hostiles standing on hero-faction tiles, passive heal for heroes
//! resting in town, full-rate heal for the `RestingInTown` state, then
//! stamina regen keyed off the entity's current `ai_state`.

use tickforge_types::{AiState, EntityId, EventCategory, EventId, EventRecord, Tile};
use tickforge_world::WorldState;

use crate::config::AgentsConfig;

/// Applies town aura damage, passive/resting heal, and stamina regen to
/// every entity, returning the events this produced.
#[must_use]
pub fn apply(world: &mut WorldState, config: &AgentsConfig) -> Vec<EventRecord> {
    let ids: Vec<EntityId> = world.entities.keys().copied().collect();
    let mut events = Vec::new();

    for id in ids {
        apply_town_aura(world, id, config, &mut events);
        apply_passive_heal(world, id, config);
        apply_resting_heal(world, id, config);
        apply_stamina_regen(world, id, config);
    }
    events
}

fn apply_town_aura(world: &mut WorldState, id: EntityId, config: &AgentsConfig, events: &mut Vec<EventRecord>) {
    let tick = world.tick;
    let Some(entity) = world.entities.get(&id) else {
        return;
    };
    let Some(tile) = world.grid.get(entity.position) else {
        return;
    };
    if !world.factions.is_enemy_territory(tile, &entity.faction) {
        return;
    }
    let max_hp = entity.effective_max_hp();
    let Some(entity) = world.entities.get_mut(&id) else {
        return;
    };
    entity.stats.hp = entity.stats.hp.saturating_sub(config.town_aura_damage).clamp(0, max_hp);
    events.push(EventRecord {
        id: EventId::from_raw(0),
        tick,
        category: EventCategory::Attack,
        message: format!("entity {id} takes {} town aura damage", config.town_aura_damage),
    });
}

fn adjacent_hostile_in_melee(world: &WorldState, id: EntityId) -> bool {
    let Some(actor) = world.entities.get(&id) else {
        return false;
    };
    world.entities.values().any(|other| {
        other.is_alive()
            && other.id != id
            && other.position.is_adjacent_to(actor.position)
            && world.factions.are_hostile(&other.faction, &actor.faction)
    })
}

fn apply_passive_heal(world: &mut WorldState, id: EntityId, config: &AgentsConfig) {
    let Some(entity) = world.entities.get(&id) else {
        return;
    };
    if !entity.is_hero {
        return;
    }
    let Some(tile) = world.grid.get(entity.position) else {
        return;
    };
    if !matches!(tile, Tile::Town) {
        return;
    }
    if adjacent_hostile_in_melee(world, id) {
        return;
    }
    let max_hp = entity.effective_max_hp();
    if let Some(entity) = world.entities.get_mut(&id) {
        entity.stats.hp = entity.stats.hp.saturating_add(config.town_passive_heal).min(max_hp);
    }
}

fn apply_resting_heal(world: &mut WorldState, id: EntityId, config: &AgentsConfig) {
    let Some(entity) = world.entities.get(&id) else {
        return;
    };
    if entity.ai_state != AiState::RestingInTown {
        return;
    }
    let max_hp = entity.effective_max_hp();
    if let Some(entity) = world.entities.get_mut(&id) {
        entity.stats.hp = entity.stats.hp.saturating_add(config.resting_heal_rate).min(max_hp);
    }
}

fn stamina_regen_for(state: AiState, config: &AgentsConfig) -> i64 {
    match state {
        AiState::RestingInTown
        | AiState::VisitShop
        | AiState::VisitBlacksmith
        | AiState::VisitGuild
        | AiState::VisitClassHall
        | AiState::VisitInn
        | AiState::VisitHome => config.stamina_regen_resting,
        AiState::Combat | AiState::Hunt | AiState::Alert | AiState::Flee => 0,
        _ => config.stamina_regen_base,
    }
}

fn apply_stamina_regen(world: &mut WorldState, id: EntityId, config: &AgentsConfig) {
    let Some(entity) = world.entities.get_mut(&id) else {
        return;
    };
    let regen = stamina_regen_for(entity.ai_state, config);
    entity.stats.stamina = entity.stats.stamina.saturating_add(regen).min(entity.stats.max_stamina);
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

    fn test_entity(id: u64, is_hero: bool, faction: &str, pos: Position, ai_state: AiState) -> Entity {
        Entity {
            id: EntityId::from_raw(id),
            kind: "test".into(),
            position: pos,
            faction: FactionTag::new(faction),
            tier: 0,
            alive: true,
            is_hero,
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
    fn resting_in_town_heals_at_full_rate() {
        let mut world = WorldState::new(1, Grid::filled(5, 5, Tile::Town));
        world.insert_entity(test_entity(1, true, "heroes", Position::new(1, 1), AiState::RestingInTown));
        let config = AgentsConfig::default();

        apply(&mut world, &config);

        let entity = &world.entities[&EntityId::from_raw(1)];
        assert_eq!(entity.stats.hp, 10 + config.resting_heal_rate);
    }

    #[test]
    fn combat_state_blocks_stamina_regen() {
        let mut world = WorldState::new(1, Grid::filled(5, 5, Tile::Floor));
        world.insert_entity(test_entity(1, false, "monsters", Position::new(1, 1), AiState::Combat));
        let config = AgentsConfig::default();

        apply(&mut world, &config);

        let entity = &world.entities[&EntityId::from_raw(1)];
        assert_eq!(entity.stats.stamina, 5);
    }

    #[test]
    fn enemy_territory_applies_aura_damage() {
        let mut world = WorldState::new(1, Grid::filled(5, 5, Tile::Town));
        world.factions.set_tile_owner(Tile::Town, FactionTag::new("monsters"));
        world.factions.declare_hostile(FactionTag::new("heroes"), FactionTag::new("monsters"));
        world.insert_entity(test_entity(1, false, "heroes", Position::new(1, 1), AiState::Wander));
        let config = AgentsConfig::default();

        let events = apply(&mut world, &config);

        let entity = &world.entities[&EntityId::from_raw(1)];
        assert_eq!(entity.stats.hp, 10 - config.town_aura_damage);
        assert!(!events.is_empty());
    }
}
