//! What one entity can currently observe (component C6).
//!
//! Built fresh each time an actor is about to decide -- never cached on
//! the entity, never mutated in place. Every query here is bounded by the
//! spatial index (a superset lookup, exact-checked against the real
//! distance) so perception cost scales with local density, not world
//! size.

use tickforge_types::{Entity, EntityId, Position, Tile};

use crate::snapshot::Snapshot;

/// A point-in-time view of the world from one entity's position, built
/// once per decision.
#[derive(Debug, Clone, Default)]
pub struct Perception {
    /// Every living entity within vision range and line of sight,
    /// nearest first.
    pub visible_entities: Vec<EntityId>,
    /// The nearest visible hostile, if any.
    pub nearest_enemy: Option<EntityId>,
    /// The visible hostile with the highest entry in the viewer's own
    /// threat table, if the viewer has aggro on anyone visible.
    pub highest_threat_enemy: Option<EntityId>,
    /// The nearest visible non-hostile entity other than the viewer.
    pub nearest_ally: Option<EntityId>,
    /// Positions within vision range carrying unclaimed ground items.
    pub ground_loot_nearby: Vec<Position>,
    /// The nearest known camp position, if any exist at all.
    pub nearest_camp: Option<Position>,
    /// A walkable tile outside the viewer's terrain memory, suitable as
    /// an exploration target for the `Wander` state.
    pub frontier_target: Option<Position>,
    /// Whether the viewer's own tile is owned by a faction hostile to it.
    pub on_enemy_territory: bool,
    /// Whether the viewer's own tile is owned by the viewer's own faction.
    pub on_home_territory: bool,
}

/// Builds a [`Perception`] for `actor` against `snapshot`.
#[must_use]
pub fn build(snapshot: &Snapshot, actor: &Entity) -> Perception {
    let visible_entities = visible_entities(snapshot, actor);

    let mut nearest_enemy = None;
    let mut nearest_enemy_dist = u32::MAX;
    let mut nearest_ally = None;
    let mut nearest_ally_dist = u32::MAX;
    let mut highest_threat_enemy = None;
    let mut highest_threat = 0.0f64;

    for &id in &visible_entities {
        let Some(candidate) = snapshot.entity(id) else {
            continue;
        };
        let dist = actor.position.manhattan_distance(candidate.position);
        let hostile = snapshot.factions().are_hostile(&candidate.faction, &actor.faction);
        if hostile {
            if dist < nearest_enemy_dist || (dist == nearest_enemy_dist && Some(id) < nearest_enemy) {
                nearest_enemy = Some(id);
                nearest_enemy_dist = dist;
            }
            if let Some(threat) = actor.threat_table.0.get(&id).copied() {
                if threat > highest_threat {
                    highest_threat = threat;
                    highest_threat_enemy = Some(id);
                }
            }
        } else if dist < nearest_ally_dist || (dist == nearest_ally_dist && Some(id) < nearest_ally) {
            nearest_ally = Some(id);
            nearest_ally_dist = dist;
        }
    }

    let highest_threat_enemy = highest_threat_enemy.or(nearest_enemy);

    let ground_loot_nearby = ground_loot_nearby(snapshot, actor);
    let nearest_camp = snapshot
        .camps()
        .iter()
        .min_by_key(|camp| actor.position.manhattan_distance(**camp))
        .copied();
    let frontier_target = find_frontier_target(snapshot, actor);

    let own_tile = snapshot.grid().get(actor.position);
    let on_enemy_territory = own_tile.is_some_and(|t| snapshot.factions().is_enemy_territory(t, &actor.faction));
    let on_home_territory = own_tile.is_some_and(|t| snapshot.factions().is_home_territory(t, &actor.faction));

    Perception {
        visible_entities,
        nearest_enemy,
        highest_threat_enemy,
        nearest_ally,
        ground_loot_nearby,
        nearest_camp,
        frontier_target,
        on_enemy_territory,
        on_home_territory,
    }
}

fn visible_entities(snapshot: &Snapshot, actor: &Entity) -> Vec<EntityId> {
    let mut candidates: Vec<EntityId> = snapshot
        .spatial_index()
        .query_radius(actor.position, actor.vision_range)
        .into_iter()
        .filter(|id| *id != actor.id)
        .filter(|id| {
            snapshot.entity(*id).is_some_and(|e| {
                e.is_alive()
                    && actor.position.manhattan_distance(e.position) <= actor.vision_range
                    && snapshot.grid().line_of_sight(actor.position, e.position)
            })
        })
        .collect();
    candidates.sort_by_key(|id| {
        let dist = snapshot.entity(*id).map_or(u32::MAX, |e| actor.position.manhattan_distance(e.position));
        (dist, *id)
    });
    candidates
}

fn ground_loot_nearby(snapshot: &Snapshot, actor: &Entity) -> Vec<Position> {
    let range = i32::try_from(actor.vision_range).unwrap_or(i32::MAX);
    let mut found = Vec::new();
    for dx in -range..=range {
        for dy in -range..=range {
            let pos = Position::new(actor.position.x.saturating_add(dx), actor.position.y.saturating_add(dy));
            if actor.position.manhattan_distance(pos) > actor.vision_range {
                continue;
            }
            if !snapshot.ground_items_at(pos).is_empty() {
                found.push(pos);
            }
        }
    }
    found.sort_by_key(|pos| (actor.position.manhattan_distance(*pos), pos.x, pos.y));
    found
}

/// Scans an expanding ring around `actor` (up to three times its vision
/// range) for the nearest walkable tile the actor has never recorded in
/// its terrain memory. Deterministic by construction: ring order and,
/// within a ring, reading order, so two actors with identical memories
/// always agree on the same frontier.
fn find_frontier_target(snapshot: &Snapshot, actor: &Entity) -> Option<Position> {
    let max_radius = i32::try_from(actor.vision_range.saturating_mul(3)).unwrap_or(i32::MAX).max(1);
    for radius in 1..=max_radius {
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx.abs().max(dy.abs()) != radius {
                    continue;
                }
                let pos = Position::new(actor.position.x.saturating_add(dx), actor.position.y.saturating_add(dy));
                let Some(tile) = snapshot.grid().get(pos) else {
                    continue;
                };
                if !Tile::is_walkable(tile) {
                    continue;
                }
                if !actor.memory.terrain_memory.contains_key(&pos) {
                    return Some(pos);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::build;
    use crate::grid::Grid;
    use crate::snapshot::Snapshot;
    use crate::world_state::WorldState;
    use std::sync::Arc;
    use tickforge_types::{
        AiState, Entity, EntityId, EntityMemory, FactionTag, Personality, Position, StatBlock,
        ThreatTable, Tile,
    };

    fn test_entity(id: u64, pos: Position, faction: &str) -> Entity {
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
                max_hp: 10,
                atk: 1,
                def: 1,
                spd: 1,
                luck: 0,
                crit_rate: 0.0,
                crit_dmg: 1.0,
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
    fn nearest_enemy_is_the_closest_hostile_in_sight() {
        let mut world = WorldState::new(1, Grid::filled(20, 20, Tile::Floor));
        world.factions.declare_hostile(FactionTag::new("heroes"), FactionTag::new("monsters"));
        world.insert_entity(test_entity(1, Position::new(5, 5), "heroes"));
        world.insert_entity(test_entity(2, Position::new(6, 5), "monsters"));
        world.insert_entity(test_entity(3, Position::new(10, 5), "monsters"));
        world.spatial_index.rebuild(world.entities.values().map(|e| (e.id, e.position)));
        let grid = Arc::new(world.grid.clone());
        let snapshot = Snapshot::build(&world, grid);

        let perception = build(&snapshot, &world.entities[&EntityId::from_raw(1)]);
        assert_eq!(perception.nearest_enemy, Some(EntityId::from_raw(2)));
    }

    #[test]
    fn frontier_target_skips_remembered_tiles() {
        let mut world = WorldState::new(1, Grid::filled(20, 20, Tile::Floor));
        let mut actor = test_entity(1, Position::new(5, 5), "heroes");
        actor.vision_range = 2;
        actor.memory.terrain_memory.insert(Position::new(6, 5), Tile::Floor);
        world.insert_entity(actor);
        world.spatial_index.rebuild(world.entities.values().map(|e| (e.id, e.position)));
        let grid = Arc::new(world.grid.clone());
        let snapshot = Snapshot::build(&world, grid);

        let perception = build(&snapshot, &world.entities[&EntityId::from_raw(1)]);
        assert_ne!(perception.frontier_target, Some(Position::new(6, 5)));
        assert!(perception.frontier_target.is_some());
    }
}
