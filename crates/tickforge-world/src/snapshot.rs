//! The immutable snapshot (component C5), published once per tick.
//!
//! Any mutation of a `Snapshot` or its contents by a reader is a
//! contract violation. Workers may hold a snapshot across any number of
//! ticks without affecting correctness other than staleness.

use std::collections::BTreeMap;
use std::sync::Arc;

use tickforge_types::{
    Building, Chest, ChestId, Entity, EntityId, ItemStack, Position, ResourceNode, ResourceNodeId,
    Region,
};

use crate::faction::FactionRegistry;
use crate::grid::Grid;
use crate::spatial_index::SpatialIndex;
use crate::world_state::WorldState;

/// An immutable, point-in-time view of the world, built once per tick.
/// Cheap to hold onto: the grid is shared by reference, entities are
/// captured by value so no reader can observe a future mutation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub tick: u64,
    pub world_seed: u64,
    grid: Arc<Grid>,
    entities: Arc<BTreeMap<EntityId, Entity>>,
    ground_items: Arc<BTreeMap<Position, Vec<ItemStack>>>,
    buildings: Arc<Vec<Building>>,
    camps: Arc<Vec<Position>>,
    resource_nodes: Arc<BTreeMap<ResourceNodeId, ResourceNode>>,
    chests: Arc<BTreeMap<ChestId, Chest>>,
    regions: Arc<Vec<Region>>,
    factions: Arc<FactionRegistry>,
    spatial_index: Arc<SpatialIndex>,
}

impl Snapshot {
    /// Builds a snapshot from the live world state. Called once at the
    /// start of Phase 2, after the spatial index has been rebuilt for
    /// this tick's entity positions.
    #[must_use]
    pub fn build(world: &WorldState, grid: Arc<Grid>) -> Self {
        Self {
            tick: world.tick,
            world_seed: world.world_seed,
            grid,
            entities: Arc::new(world.entities.clone()),
            ground_items: Arc::new(world.ground_items.clone()),
            buildings: Arc::new(world.buildings.clone()),
            camps: Arc::new(world.camps.clone()),
            resource_nodes: Arc::new(world.resource_nodes.clone()),
            chests: Arc::new(world.chests.clone()),
            regions: Arc::new(world.regions.clone()),
            factions: Arc::new(world.factions.clone()),
            spatial_index: Arc::new(world.spatial_index.clone()),
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    #[must_use]
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    #[must_use]
    pub fn ground_items_at(&self, pos: Position) -> &[ItemStack] {
        self.ground_items.get(&pos).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    #[must_use]
    pub fn camps(&self) -> &[Position] {
        &self.camps
    }

    #[must_use]
    pub fn resource_node(&self, id: ResourceNodeId) -> Option<&ResourceNode> {
        self.resource_nodes.get(&id)
    }

    #[must_use]
    pub fn resource_nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.resource_nodes.values()
    }

    #[must_use]
    pub fn chest(&self, id: ChestId) -> Option<&Chest> {
        self.chests.get(&id)
    }

    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    #[must_use]
    pub fn factions(&self) -> &FactionRegistry {
        &self.factions
    }

    #[must_use]
    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.spatial_index
    }
}
