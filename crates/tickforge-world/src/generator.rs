//! Phase-1 entity generators: spawn new entities into `WorldState` at the
//! start of a tick, keyed by the deterministic RNG's `Spawn` domain.
//!
//! World-generation *content* (terrain painting, initial population,
//! item/class tables) is out of scope here; a generator only decides,
//! given the current tick, whether to spawn one more entity of a kind it
//! owns, and what its starting stats are. The decision and the spawned
//! entity's fields must be a pure function of `(world_seed, tick, newly
//! allocated id)` so replays are exact.

use tickforge_rng::{hash64, roll_range, Domain};
use tickforge_types::{
    AiState, Entity, EntityMemory, FactionTag, Personality, Position, StatBlock, ThreatTable,
};

use crate::world_state::WorldState;

/// A single spawn rule: a mob kind that respawns on a fixed cadence up
/// to a population cap, within a rectangular region.
#[derive(Debug, Clone)]
pub struct SpawnGenerator {
    pub kind: String,
    pub faction: FactionTag,
    pub spawn_region: (Position, Position),
    pub interval_ticks: u64,
    pub population_cap: usize,
    pub base_stats: StatBlock,
    pub tier: u8,
    pub vision_range: u32,
    pub weapon_range: u32,
    pub leash_radius: Option<u32>,
}

impl SpawnGenerator {
    /// Whether this generator should spawn on `tick`, given how many
    /// live entities of its kind already exist.
    #[must_use]
    pub fn should_spawn(&self, tick: u64, live_count_of_kind: usize) -> bool {
        live_count_of_kind < self.population_cap
            && self.interval_ticks > 0
            && tick % self.interval_ticks == 0
    }

    /// Spawns one entity into `world`, reserving a fresh id and choosing
    /// a position deterministically within `spawn_region` via the RNG's
    /// `Spawn` domain keyed by the new id and tick.
    #[allow(clippy::cast_precision_loss)]
    pub fn spawn(&self, world: &mut WorldState) -> Entity {
        let id = world.alloc_entity_id();
        let tick = world.tick;
        let (min_corner, max_corner) = self.spawn_region;
        let x_span = u64::from(max_corner.x.saturating_sub(min_corner.x).unsigned_abs());
        let y_span = u64::from(max_corner.y.saturating_sub(min_corner.y).unsigned_abs());
        let x_offset = roll_range(world.world_seed, Domain::Spawn, id.get(), tick, 0, 0, x_span);
        let y_offset = roll_range(world.world_seed, Domain::Spawn, id.get(), tick, 1, 0, y_span);
        let position = Position::new(
            min_corner.x.saturating_add(i32::try_from(x_offset).unwrap_or(0)),
            min_corner.y.saturating_add(i32::try_from(y_offset).unwrap_or(0)),
        );
        // Reserved subkey for spawn-variant selection (e.g. picking among
        // several mob kinds sharing one generator); unused while each
        // generator covers exactly one kind.
        let _ = hash64(world.world_seed, Domain::Spawn, id.get(), tick, 2);

        Entity {
            id,
            kind: self.kind.clone(),
            position,
            faction: self.faction.clone(),
            tier: self.tier,
            alive: true,
            is_hero: false,
            stats: self.base_stats,
            class_tag: None,
            skills: Vec::new(),
            status_effects: Vec::new(),
            personality: Personality::default(),
            inventory: None,
            home_storage: None,
            ai_state: AiState::Wander,
            next_act_at: tick as f64,
            memory: EntityMemory::default(),
            engaged_ticks: 0,
            threat_table: ThreatTable::default(),
            cached_path: None,
            cached_path_target: None,
            combat_target_id: None,
            loot_progress: 0,
            loot_duration: 3,
            home_pos: position,
            vision_range: self.vision_range,
            weapon_range: self.weapon_range,
            leash_radius: self.leash_radius,
        }
    }
}

/// Runs every registered generator against `world` for the current tick,
/// inserting any spawned entities. Returns the number spawned, for
/// observability logging.
pub fn run_generators(world: &mut WorldState, generators: &[SpawnGenerator]) -> usize {
    let mut spawned = 0;
    for generator in generators {
        let live_count = world
            .entities
            .values()
            .filter(|e| e.is_alive() && e.kind == generator.kind)
            .count();
        if generator.should_spawn(world.tick, live_count) {
            let entity = generator.spawn(world);
            world.insert_entity(entity);
            spawned += 1;
        }
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::{run_generators, SpawnGenerator};
    use crate::grid::Grid;
    use crate::world_state::WorldState;
    use tickforge_types::{FactionTag, Position, StatBlock, Tile};

    fn goblin_stats() -> StatBlock {
        StatBlock {
            hp: 15,
            max_hp: 15,
            atk: 3,
            def: 0,
            spd: 5,
            luck: 0,
            crit_rate: 0.05,
            crit_dmg: 1.5,
            evasion: 0.0,
            matk: 0,
            mdef: 0,
            stamina: 10,
            max_stamina: 10,
            level: 1,
            xp: 0,
            xp_to_next: 50,
            gold: 0,
        }
    }

    #[test]
    fn spawn_is_deterministic_given_same_seed_and_tick() {
        let generator = SpawnGenerator {
            kind: "goblin".into(),
            faction: FactionTag::new("monsters"),
            spawn_region: (Position::new(0, 0), Position::new(7, 7)),
            interval_ticks: 1,
            population_cap: 10,
            base_stats: goblin_stats(),
            tier: 0,
            vision_range: 6,
            weapon_range: 1,
            leash_radius: Some(10),
        };

        let mut world_a = WorldState::new(42, Grid::filled(8, 8, Tile::Floor));
        let mut world_b = WorldState::new(42, Grid::filled(8, 8, Tile::Floor));
        run_generators(&mut world_a, std::slice::from_ref(&generator));
        run_generators(&mut world_b, std::slice::from_ref(&generator));

        let a: Vec<_> = world_a.entities.values().map(|e| e.position).collect();
        let b: Vec<_> = world_b.entities.values().map(|e| e.position).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn population_cap_is_respected() {
        let generator = SpawnGenerator {
            kind: "goblin".into(),
            faction: FactionTag::new("monsters"),
            spawn_region: (Position::new(0, 0), Position::new(7, 7)),
            interval_ticks: 1,
            population_cap: 2,
            base_stats: goblin_stats(),
            tier: 0,
            vision_range: 6,
            weapon_range: 1,
            leash_radius: Some(10),
        };

        let mut world = WorldState::new(7, Grid::filled(8, 8, Tile::Floor));
        for _ in 0..5 {
            run_generators(&mut world, std::slice::from_ref(&generator));
            world.tick += 1;
        }
        assert_eq!(world.entities.len(), 2);
    }
}
