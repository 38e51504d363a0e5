//! The authoritative, mutable world state (component C4).
//!
//! Owned exclusively by the `WorldLoop` thread/task. Every other piece
//! of the engine reads a `Snapshot` built from this, never this struct
//! directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tickforge_types::{
    Building, Chest, ChestId, Entity, EntityId, IdAllocator, ItemId, ItemStack, Position, Quest,
    ResourceNode, ResourceNodeId, Region,
};

use crate::faction::FactionRegistry;
use crate::grid::Grid;
use crate::spatial_index::{SpatialIndex, DEFAULT_CELL_SIZE};

/// The single mutable source of truth for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub tick: u64,
    pub world_seed: u64,
    pub grid: Grid,
    pub entities: BTreeMap<EntityId, Entity>,
    pub ground_items: BTreeMap<Position, Vec<ItemStack>>,
    pub buildings: Vec<Building>,
    pub camps: Vec<Position>,
    pub resource_nodes: BTreeMap<ResourceNodeId, ResourceNode>,
    pub chests: BTreeMap<ChestId, Chest>,
    pub regions: Vec<Region>,
    pub factions: FactionRegistry,
    pub spatial_index: SpatialIndex,
    /// Per-entity quest instances (step j). Quest reward/requirement
    /// content is embedder-owned; this is just progress-tracking state.
    pub quests: Vec<Quest>,
    /// Human-readable goal strings recomputed each tick for observability
    /// (step l). Not part of simulation state proper -- display-only, and
    /// never read by the brain or resolver.
    pub goal_strings: BTreeMap<EntityId, String>,

    entity_ids: IdAllocator<EntityId>,
    resource_node_ids: IdAllocator<ResourceNodeId>,
    chest_ids: IdAllocator<ChestId>,
    item_ids: IdAllocator<ItemId>,
}

impl WorldState {
    #[must_use]
    pub fn new(world_seed: u64, grid: Grid) -> Self {
        Self {
            tick: 0,
            world_seed,
            grid,
            entities: BTreeMap::new(),
            ground_items: BTreeMap::new(),
            buildings: Vec::new(),
            camps: Vec::new(),
            resource_nodes: BTreeMap::new(),
            chests: BTreeMap::new(),
            regions: Vec::new(),
            factions: FactionRegistry::new(),
            spatial_index: SpatialIndex::new(DEFAULT_CELL_SIZE),
            quests: Vec::new(),
            goal_strings: BTreeMap::new(),
            entity_ids: IdAllocator::default(),
            resource_node_ids: IdAllocator::default(),
            chest_ids: IdAllocator::default(),
            item_ids: IdAllocator::default(),
        }
    }

    pub fn alloc_entity_id(&mut self) -> EntityId {
        self.entity_ids.alloc()
    }

    pub fn alloc_resource_node_id(&mut self) -> ResourceNodeId {
        self.resource_node_ids.alloc()
    }

    pub fn alloc_chest_id(&mut self) -> ChestId {
        self.chest_ids.alloc()
    }

    pub fn alloc_item_id(&mut self) -> ItemId {
        self.item_ids.alloc()
    }

    pub fn insert_entity(&mut self, entity: Entity) {
        self.entities.insert(entity.id, entity);
    }

    pub fn drop_items_at(&mut self, pos: Position, items: Vec<ItemStack>) {
        if items.is_empty() {
            return;
        }
        self.ground_items.entry(pos).or_default().extend(items);
    }

    /// Entities with `next_act_at <= current tick`, ordered by
    /// `(next_act_at, id)` -- the scheduling order Phase 1 hands to the
    /// worker pool.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ready_actors(&self) -> Vec<EntityId> {
        let current = self.tick as f64;
        let mut ready: Vec<_> = self
            .entities
            .values()
            .filter(|e| e.is_alive() && e.next_act_at <= current)
            .map(|e| (e.next_act_at, e.id))
            .collect();
        ready.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(core::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        ready.into_iter().map(|(_, id)| id).collect()
    }
}
