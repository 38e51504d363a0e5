//! Terrain/entity memory update and pruning (bookkeeping step h).
//!
//! Terrain memory only grows: once a tile has been seen it stays known
//! forever. Entity memory is a rolling window -- refreshed while
//! visible, marked stale the moment it drops out of sight, and dropped
//! once its subject is long gone or long unseen.

use tickforge_types::{EntityId, EntityMemoryEntry, Position};
use tickforge_world::WorldState;

use crate::config::AgentsConfig;

/// Updates every entity's terrain and entity memory, pruning stale
/// entries per `config.memory_horizon_ticks`.
pub fn apply(world: &mut WorldState, config: &AgentsConfig) {
    let tick = world.tick;
    let ids: Vec<EntityId> = world.entities.keys().copied().collect();

    for id in ids {
        let Some(actor) = world.entities.get(&id) else {
            continue;
        };
        let visible_cells = visible_cells(world, actor.position, actor.vision_range);
        let visible_entities = visible_entities(world, actor.position, actor.vision_range, id);

        let Some(actor) = world.entities.get_mut(&id) else {
            continue;
        };
        for (pos, tile) in visible_cells {
            actor.memory.terrain_memory.entry(pos).or_insert(tile);
        }

        for entry in actor.memory.entity_memory.values_mut() {
            entry.visible_now = false;
        }
        for (seen_id, position, kind, hp, max_hp) in visible_entities {
            actor
                .memory
                .entity_memory
                .entry(seen_id)
                .and_modify(|entry| {
                    entry.last_position = position;
                    entry.last_kind.clone_from(&kind);
                    entry.last_hp = hp;
                    entry.last_max_hp = max_hp;
                    entry.last_tick_seen = tick;
                    entry.visible_now = true;
                })
                .or_insert(EntityMemoryEntry {
                    last_position: position,
                    last_kind: kind,
                    last_hp: hp,
                    last_max_hp: max_hp,
                    last_tick_seen: tick,
                    visible_now: true,
                });
        }

        actor.memory.entity_memory.retain(|seen_id, entry| {
            let still_exists = world.entities.get(seen_id).is_some_and(tickforge_types::Entity::is_alive);
            let fresh = tick.saturating_sub(entry.last_tick_seen) <= config.memory_horizon_ticks;
            still_exists && fresh
        });
    }
}

fn visible_cells(world: &WorldState, center: Position, vision_range: u32) -> Vec<(Position, tickforge_types::Tile)> {
    let range = i32::try_from(vision_range).unwrap_or(i32::MAX);
    let mut found = Vec::new();
    for dx in -range..=range {
        for dy in -range..=range {
            let pos = Position::new(center.x.saturating_add(dx), center.y.saturating_add(dy));
            if center.manhattan_distance(pos) > vision_range {
                continue;
            }
            let Some(tile) = world.grid.get(pos) else {
                continue;
            };
            if world.grid.line_of_sight(center, pos) {
                found.push((pos, tile));
            }
        }
    }
    found
}

#[allow(clippy::type_complexity)]
fn visible_entities(
    world: &WorldState,
    center: Position,
    vision_range: u32,
    viewer_id: EntityId,
) -> Vec<(EntityId, Position, String, i64, i64)> {
    world
        .spatial_index
        .query_radius(center, vision_range)
        .into_iter()
        .filter(|id| *id != viewer_id)
        .filter_map(|id| {
            let entity = world.entities.get(&id)?;
            if !entity.is_alive() || center.manhattan_distance(entity.position) > vision_range {
                return None;
            }
            if !world.grid.line_of_sight(center, entity.position) {
                return None;
            }
            Some((id, entity.position, entity.kind.clone(), entity.stats.hp, entity.effective_max_hp()))
        })
        .collect()
}
