//! Dead-entity cleanup and hero respawn (bookkeeping step c).
//!
//! Non-hero entities with hp at or below zero leave the entity map for
//! good, dropping everything they carried at their last cell. Heroes
//! never leave the map: they reset in place, at their home, with an
//! empty bag and a cooldown before they can act again.

use tickforge_types::{AiState, EntityId, EventCategory, EventId, EventRecord, ItemStack};
use tickforge_world::WorldState;

use crate::config::AgentsConfig;

/// Applies death and hero respawn to every entity at or below zero hp,
/// returning the events this produced.
#[must_use]
pub fn apply(world: &mut WorldState, config: &AgentsConfig) -> Vec<EventRecord> {
    let dead: Vec<EntityId> = world
        .entities
        .values()
        .filter(|entity| entity.stats.hp <= 0)
        .map(|entity| entity.id)
        .collect();

    let mut events = Vec::new();
    for id in dead {
        if let Some(entity) = world.entities.get(&id) {
            if entity.is_hero {
                respawn_hero(world, id, &mut events);
            } else {
                remove_corpse(world, id, &mut events);
            }
        }
    }
    events
}

fn remove_corpse(world: &mut WorldState, id: EntityId, events: &mut Vec<EventRecord>) {
    let Some(mut entity) = world.entities.remove(&id) else {
        return;
    };
    let position = entity.position;
    let mut dropped: Vec<ItemStack> = Vec::new();
    if let Some(inventory) = entity.inventory.take() {
        dropped.extend(inventory.bag);
        dropped.extend(inventory.equipment.into_values());
    }
    world.drop_items_at(position, dropped);
    events.push(EventRecord {
        id: EventId::from_raw(0),
        tick: world.tick,
        category: EventCategory::Death,
        message: format!("{} died at ({}, {})", entity.kind, position.x, position.y),
    });
}

fn respawn_hero(world: &mut WorldState, id: EntityId, events: &mut Vec<EventRecord>) {
    let Some(entity) = world.entities.get_mut(&id) else {
        return;
    };
    let death_position = entity.position;
    let kind = entity.kind.clone();

    let dropped: Vec<ItemStack> = entity
        .inventory
        .as_mut()
        .map(|inventory| std::mem::take(&mut inventory.bag))
        .unwrap_or_default();

    entity.stats.hp = entity.stats.max_hp;
    entity.position = entity.home_pos;
    entity.ai_state = AiState::RestingInTown;
    #[allow(clippy::cast_precision_loss)]
    let respawn_delay = config.respawn_cooldown_ticks as f64;
    entity.next_act_at += respawn_delay;

    world.drop_items_at(death_position, dropped);
    events.push(EventRecord {
        id: EventId::from_raw(0),
        tick: world.tick,
        category: EventCategory::Death,
        message: format!("{kind} fell and is respawning"),
    });
}

#[cfg(test)]
mod tests {
    use super::apply;
    use crate::config::AgentsConfig;
    use tickforge_types::{
        AiState, Entity, EntityId, EntityMemory, FactionTag, Inventory, ItemId, ItemStack,
        Personality, Position, StatBlock, ThreatTable, Tile,
    };
    use tickforge_world::{Grid, WorldState};

    fn test_entity(id: u64, is_hero: bool, hp: i64) -> Entity {
        Entity {
            id: EntityId::from_raw(id),
            kind: "test".into(),
            position: Position::new(3, 3),
            faction: FactionTag::new("heroes"),
            tier: 0,
            alive: true,
            is_hero,
            stats: StatBlock {
                hp,
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
                stamina: 10,
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
            inventory: Some(Inventory {
                bag: vec![ItemStack { item_id: ItemId::from_raw(1), item_tag: "potion".into(), quantity: 2 }],
                equipment: std::collections::BTreeMap::new(),
                capacity: 10,
            }),
            home_storage: None,
            ai_state: AiState::Combat,
            next_act_at: 5.0,
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
    fn non_hero_corpse_is_removed_and_drops_items() {
        let mut world = WorldState::new(1, Grid::filled(10, 10, Tile::Floor));
        world.insert_entity(test_entity(1, false, 0));
        let config = AgentsConfig::default();

        let events = apply(&mut world, &config);

        assert!(!world.entities.contains_key(&EntityId::from_raw(1)));
        assert_eq!(world.ground_items.get(&Position::new(3, 3)).map(Vec::len), Some(1));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn hero_respawns_instead_of_being_removed() {
        let mut world = WorldState::new(1, Grid::filled(10, 10, Tile::Floor));
        world.insert_entity(test_entity(2, true, 0));
        let config = AgentsConfig::default();

        apply(&mut world, &config);

        let hero = world.entities.get(&EntityId::from_raw(2)).expect("hero survives");
        assert_eq!(hero.stats.hp, hero.stats.max_hp);
        assert_eq!(hero.position, Position::new(0, 0));
        assert_eq!(hero.ai_state, AiState::RestingInTown);
        assert_eq!(hero.next_act_at, 15.0);
        assert!(hero.inventory.as_ref().expect("inventory kept").bag.is_empty());
        assert_eq!(world.ground_items.get(&Position::new(3, 3)).map(Vec::len), Some(1));
    }
}
