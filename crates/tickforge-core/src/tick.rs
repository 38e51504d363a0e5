//! The four-phase world loop (component C10): scheduling, dispatch,
//! resolution, and bookkeeping, run once per [`WorldLoop::step`] call.
//!
//! 1. **Scheduling & generators** -- advance the tick counter, run every
//!    registered [`SpawnGenerator`], rebuild the spatial index, and
//!    collect this tick's ready actors.
//! 2. **Snapshot & dispatch** -- publish an immutable [`Snapshot`] of the
//!    post-spawn world and hand ready actors to the worker pool.
//! 3. **Resolve & apply** -- total-order the resulting proposals through
//!    the conflict resolver against the live, mutable world.
//! 4. **Bookkeeping** -- vitals, territory, death, status effects,
//!    resource-node regen, skills, memory, threat decay, quests,
//!    engagement tracking, and goal strings, each a discrete pass over
//!    the post-resolution world.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tickforge_agents::actions::{resolve_tick, ActionContext};
use tickforge_agents::{
    death, memory, skills, status_effects, territory, threat, vitals, AgentsConfig, ItemRegistry,
    SkillRegistry,
};
use tickforge_types::{
    AiState, EntityId, EventCategory, EventId, EventRecord, FactionTag, Position, QuestKind,
};
use tickforge_world::{run_generators, Snapshot, SpawnGenerator, WorldState};

use crate::error::TickError;
use crate::worker_pool;

/// Everything [`WorldLoop::step`] needs beyond the world itself, bundled
/// so the engine manager constructs it once and reuses it every tick.
pub struct WorldLoop {
    world: WorldState,
    generators: Vec<SpawnGenerator>,
    config: AgentsConfig,
    items: Arc<ItemRegistry>,
    skills: Arc<SkillRegistry>,
    worker_deadline: Duration,
}

/// A compact record of what one [`WorldLoop::step`] call did, returned to
/// the caller for logging and for appending to the event log.
#[derive(Debug, Clone)]
pub struct TickSummary {
    pub tick: u64,
    pub spawned: usize,
    pub ready_actors: usize,
    pub events: Vec<EventRecord>,
}

impl WorldLoop {
    #[must_use]
    pub fn new(
        world: WorldState,
        generators: Vec<SpawnGenerator>,
        config: AgentsConfig,
        items: Arc<ItemRegistry>,
        skills: Arc<SkillRegistry>,
        worker_deadline: Duration,
    ) -> Self {
        Self {
            world,
            generators,
            config,
            items,
            skills,
            worker_deadline,
        }
    }

    #[must_use]
    pub const fn world(&self) -> &WorldState {
        &self.world
    }

    /// Replaces the live world wholesale, e.g. to restart a run from a
    /// freshly generated `WorldState` built from the same seed.
    pub fn replace_world(&mut self, world: WorldState) {
        self.world = world;
    }

    /// Runs one full tick: scheduling, dispatch, resolution, and
    /// bookkeeping, in that fixed order.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] if a downstream world operation reports a
    /// malformed-state invariant breach. Ordinary gameplay outcomes
    /// (a blocked move, a dead target, an empty resource node) never
    /// reach this -- the resolver downgrades those to Rest in place.
    pub fn step(&mut self) -> Result<TickSummary, TickError> {
        // Phase 1: scheduling & generators.
        self.world.tick = self.world.tick.saturating_add(1);
        let spawned = run_generators(&mut self.world, &self.generators);
        self.world.spatial_index.rebuild(
            self.world
                .entities
                .values()
                .map(|entity| (entity.id, entity.position)),
        );
        let ready = self.world.ready_actors();

        // Phase 2: snapshot & dispatch.
        let grid = Arc::new(self.world.grid.clone());
        let snapshot = Snapshot::build(&self.world, grid);
        let proposals = worker_pool::dispatch(
            &snapshot,
            &ready,
            &self.config,
            &self.items,
            &self.skills,
            self.worker_deadline,
        );

        // Phase 3: resolve & apply.
        let action_ctx = ActionContext {
            config: &self.config,
            items: &self.items,
            skills: &self.skills,
        };
        let mut events = resolve_tick(&mut self.world, &proposals, &action_ctx);

        // Phase 4: bookkeeping, steps (a) through (l).
        events.extend(vitals::apply(&mut self.world, &self.config));
        events.extend(territory::apply(&mut self.world, &self.config));
        let dying_kinds = dying_entity_kinds(&self.world);
        events.extend(death::apply(&mut self.world, &self.config));
        events.extend(status_effects::apply(&mut self.world));
        tick_resource_nodes(&mut self.world);
        events.extend(skills::apply(&mut self.world, &self.config));
        memory::apply(&mut self.world, &self.config);
        threat::apply(&mut self.world, &self.config);
        let quest_events = tick_quests(&mut self.world, &events, &dying_kinds);
        events.extend(quest_events);
        tick_engagement(&mut self.world);
        update_goal_strings(&mut self.world);

        Ok(TickSummary {
            tick: self.world.tick,
            spawned,
            ready_actors: ready.len(),
            events,
        })
    }
}

/// Captures the `kind` of every entity at or below zero hp *before*
/// [`death::apply`] removes them, so the quest pass can match Kill
/// quests structurally instead of parsing a Death event's message text.
fn dying_entity_kinds(world: &WorldState) -> Vec<String> {
    world
        .entities
        .values()
        .filter(|entity| entity.stats.hp <= 0)
        .map(|entity| entity.kind.clone())
        .collect()
}

/// Regenerates depleted resource nodes (step e), complementing the
/// Harvest handler's own decrement-and-start-cooldown logic in the
/// action pipeline: once a node hits zero remaining yield, this is the
/// only place that counts its cooldown down and eventually restores it.
fn tick_resource_nodes(world: &mut WorldState) {
    for node in world.resource_nodes.values_mut() {
        if node.remaining == 0 {
            if node.cooldown_remaining > 0 {
                node.cooldown_remaining = node.cooldown_remaining.saturating_sub(1);
            } else {
                node.remaining = node.max_harvests;
            }
        }
    }
}

/// Advances every active quest's progress against this tick's outcomes
/// (step j) and emits a completion event the first tick it reaches its
/// goal. Matching is owner-agnostic: any active quest of the matching
/// kind and target tag progresses on a matching world event, regardless
/// of which specific entity caused it, since killer/harvester identity
/// isn't tracked anywhere the bookkeeping layer can reach.
fn tick_quests(world: &mut WorldState, events_so_far: &[EventRecord], dying_kinds: &[String]) -> Vec<EventRecord> {
    let tick = world.tick;
    let regions = world.regions.clone();
    let positions: BTreeMap<EntityId, Position> =
        world.entities.iter().map(|(id, entity)| (*id, entity.position)).collect();
    let mut completions = Vec::new();

    for quest in &mut world.quests {
        if quest.completed_at_tick.is_some() {
            continue;
        }
        let progressed = match quest.kind {
            QuestKind::Kill => dying_kinds.iter().filter(|kind| **kind == quest.target_tag).count(),
            QuestKind::Harvest => events_so_far
                .iter()
                .filter(|event| event.category == EventCategory::Harvest && harvested_tag(&event.message) == Some(quest.target_tag.as_str()))
                .count(),
            QuestKind::Loot => events_so_far
                .iter()
                .filter(|event| event.category == EventCategory::Loot && looted_tag(&event.message) == Some(quest.target_tag.as_str()))
                .count(),
            QuestKind::Explore => {
                let owner_pos = positions.get(&quest.owner).copied();
                let inside = owner_pos.is_some_and(|pos| {
                    regions.iter().any(|region| region.name == quest.target_tag && region.contains(pos))
                });
                usize::from(inside)
            }
        };
        if progressed > 0 {
            quest.progress = quest.progress.saturating_add(u32::try_from(progressed).unwrap_or(u32::MAX));
        }
        if quest.is_complete() {
            quest.completed_at_tick = Some(tick);
            completions.push(EventRecord {
                id: EventId::from_raw(0),
                tick,
                category: EventCategory::Quest,
                message: format!("entity {} completes quest {}", quest.owner, quest.quest_tag),
            });
        }
    }
    completions
}

/// Extracts the yield tag from a Harvest handler's
/// `"entity {id} harvests {yield_tag}"` message.
fn harvested_tag(message: &str) -> Option<&str> {
    message.split_once(" harvests ").map(|(_, tag)| tag)
}

/// Extracts the item tag from a Loot handler's
/// `"entity {id} loots {tag} x{qty}"` message.
fn looted_tag(message: &str) -> Option<&str> {
    let (_, after) = message.split_once(" loots ")?;
    after.split(" x").next()
}

/// Increments (or resets) every entity's `engaged_ticks` counter (step
/// k) based on whether a hostile is currently standing adjacent to it --
/// the same adjacency-and-hostility test the action pipeline's opening
/// attack check uses, applied here once per tick rather than per action.
fn tick_engagement(world: &mut WorldState) {
    let snapshot: Vec<(EntityId, Position, FactionTag, bool)> = world
        .entities
        .values()
        .map(|entity| (entity.id, entity.position, entity.faction.clone(), entity.is_alive()))
        .collect();

    let engaged: BTreeMap<EntityId, bool> = snapshot
        .iter()
        .filter(|(_, _, _, alive)| *alive)
        .map(|(id, pos, faction, _)| {
            let adjacent_hostile = snapshot.iter().any(|(other_id, other_pos, other_faction, other_alive)| {
                *other_alive
                    && other_id != id
                    && other_pos.is_adjacent_to(*pos)
                    && world.factions.are_hostile(other_faction, faction)
            });
            (*id, adjacent_hostile)
        })
        .collect();

    for (id, adjacent_hostile) in engaged {
        if let Some(entity) = world.entities.get_mut(&id) {
            entity.engaged_ticks = if adjacent_hostile {
                entity.engaged_ticks.saturating_add(1)
            } else {
                0
            };
        }
    }
}

/// Recomputes every entity's human-readable goal string (step l) from
/// its current `ai_state` and, where relevant, its `combat_target_id`.
/// Display-only: nothing in the brain or resolver ever reads this back.
fn update_goal_strings(world: &mut WorldState) {
    let mut goal_strings = BTreeMap::new();
    for entity in world.entities.values() {
        let text = match entity.ai_state {
            AiState::Idle => "idling".to_string(),
            AiState::Wander => "wandering".to_string(),
            AiState::RestingInTown => "resting in town".to_string(),
            AiState::GuardCamp => "guarding camp".to_string(),
            AiState::Hunt => entity
                .combat_target_id
                .map_or_else(|| "hunting".to_string(), |target| format!("hunting entity {target}")),
            AiState::Combat => entity
                .combat_target_id
                .map_or_else(|| "fighting".to_string(), |target| format!("fighting entity {target}")),
            AiState::Flee => "fleeing".to_string(),
            AiState::Looting => "looting".to_string(),
            AiState::Alert => "on alert".to_string(),
            AiState::Harvesting => "harvesting".to_string(),
            AiState::ReturnToTown => "returning to town".to_string(),
            AiState::ReturnToCamp => "returning to camp".to_string(),
            AiState::VisitShop => "visiting the shop".to_string(),
            AiState::VisitBlacksmith => "visiting the blacksmith".to_string(),
            AiState::VisitGuild => "visiting the guild".to_string(),
            AiState::VisitClassHall => "visiting the class hall".to_string(),
            AiState::VisitInn => "visiting the inn".to_string(),
            AiState::VisitHome => "visiting home".to_string(),
        };
        goal_strings.insert(entity.id, text);
    }
    world.goal_strings = goal_strings;
}

#[cfg(test)]
mod tests {
    use super::WorldLoop;
    use std::sync::Arc;
    use std::time::Duration;
    use tickforge_agents::{AgentsConfig, ItemRegistry, SkillRegistry};
    use tickforge_types::{
        AiState, Entity, EntityId, EntityMemory, FactionTag, Personality, Position, Quest,
        QuestKind, StatBlock, ThreatTable, Tile,
    };
    use tickforge_world::{Grid, WorldState};

    fn test_entity(id: u64, kind: &str, position: Position) -> Entity {
        Entity {
            id: EntityId::from_raw(id),
            kind: kind.to_string(),
            position,
            faction: FactionTag::new("heroes"),
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
            home_pos: position,
            vision_range: 8,
            weapon_range: 1,
            leash_radius: None,
        }
    }

    fn test_loop(world: WorldState) -> WorldLoop {
        WorldLoop::new(
            world,
            Vec::new(),
            AgentsConfig::default(),
            Arc::new(ItemRegistry::new()),
            Arc::new(SkillRegistry::new()),
            Duration::from_millis(50),
        )
    }

    #[test]
    fn step_advances_tick_and_resolves_every_ready_actor() {
        let mut world = WorldState::new(1, Grid::filled(16, 16, Tile::Floor));
        world.insert_entity(test_entity(1, "hero", Position::new(2, 2)));
        world.insert_entity(test_entity(2, "hero", Position::new(3, 3)));
        let mut world_loop = test_loop(world);

        let summary = world_loop.step().expect("tick succeeds");

        assert_eq!(summary.tick, 1);
        assert_eq!(summary.ready_actors, 2);
        assert_eq!(world_loop.world().tick, 1);
    }

    #[test]
    fn goal_strings_are_populated_for_every_entity_after_a_step() {
        let mut world = WorldState::new(1, Grid::filled(16, 16, Tile::Floor));
        world.insert_entity(test_entity(1, "hero", Position::new(2, 2)));
        let mut world_loop = test_loop(world);

        world_loop.step().expect("tick succeeds");

        assert_eq!(
            world_loop.world().goal_strings.get(&EntityId::from_raw(1)).map(String::as_str),
            Some("idling")
        );
    }

    #[test]
    fn kill_quest_progresses_when_a_matching_kind_dies() {
        let mut world = WorldState::new(1, Grid::filled(16, 16, Tile::Floor));
        let mut victim = test_entity(2, "goblin", Position::new(5, 5));
        victim.stats.hp = 0;
        victim.is_hero = false;
        world.insert_entity(victim);
        world.quests.push(Quest {
            quest_tag: "slay_goblins".into(),
            owner: EntityId::from_raw(1),
            kind: QuestKind::Kill,
            target_tag: "goblin".into(),
            progress: 0,
            goal: 1,
            completed_at_tick: None,
        });
        let mut world_loop = test_loop(world);

        let summary = world_loop.step().expect("tick succeeds");

        let quest = &world_loop.world().quests[0];
        assert_eq!(quest.progress, 1);
        assert!(quest.completed_at_tick.is_some());
        assert!(summary
            .events
            .iter()
            .any(|event| event.category == tickforge_types::EventCategory::Quest));
    }

    #[test]
    fn resource_node_regenerates_after_its_cooldown_elapses() {
        use tickforge_types::ResourceNode;

        let mut world = WorldState::new(1, Grid::filled(8, 8, Tile::Floor));
        let id = world.alloc_resource_node_id();
        world.resource_nodes.insert(
            id,
            ResourceNode {
                id,
                position: Position::new(1, 1),
                resource_tag: "tree".into(),
                remaining: 0,
                max_harvests: 3,
                cooldown_remaining: 1,
                respawn_cooldown: 1,
                yield_item_tag: "wood".into(),
            },
        );
        let mut world_loop = test_loop(world);

        world_loop.step().expect("first tick counts cooldown down");
        assert_eq!(world_loop.world().resource_nodes[&id].remaining, 0);

        world_loop.step().expect("second tick restores the node");
        assert_eq!(world_loop.world().resource_nodes[&id].remaining, 3);
    }
}
