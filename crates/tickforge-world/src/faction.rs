//! The faction registry: which tiles belong to which faction, and which
//! factions are hostile to each other.
//!
//! Content (the actual faction list and tile ownership) is supplied by
//! the embedder at world-generation time; this module is the mechanism
//! perception and bookkeeping query against.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tickforge_types::{FactionTag, Tile};

/// Maps tile kinds to an owning faction and records which faction pairs
/// are hostile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactionRegistry {
    tile_owners: Vec<(Tile, FactionTag)>,
    hostile_pairs: BTreeSet<(FactionTag, FactionTag)>,
}

impl FactionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tile_owner(&mut self, tile: Tile, faction: FactionTag) {
        self.tile_owners.retain(|(t, _)| *t != tile);
        self.tile_owners.push((tile, faction));
    }

    #[must_use]
    pub fn owner_of_tile(&self, tile: Tile) -> Option<&FactionTag> {
        self.tile_owners
            .iter()
            .find(|(t, _)| *t == tile)
            .map(|(_, faction)| faction)
    }

    /// Declares two factions mutually hostile. Order does not matter;
    /// both directions are recorded.
    pub fn declare_hostile(&mut self, a: FactionTag, b: FactionTag) {
        self.hostile_pairs.insert((a.clone(), b.clone()));
        self.hostile_pairs.insert((b, a));
    }

    #[must_use]
    pub fn are_hostile(&self, a: &FactionTag, b: &FactionTag) -> bool {
        a != b && self.hostile_pairs.contains(&(a.clone(), b.clone()))
    }

    /// Whether `tile` is owned by a faction hostile to `viewer_faction`.
    #[must_use]
    pub fn is_enemy_territory(&self, tile: Tile, viewer_faction: &FactionTag) -> bool {
        self.owner_of_tile(tile)
            .is_some_and(|owner| self.are_hostile(owner, viewer_faction))
    }

    /// Whether `tile` is owned by `viewer_faction` itself.
    #[must_use]
    pub fn is_home_territory(&self, tile: Tile, viewer_faction: &FactionTag) -> bool {
        self.owner_of_tile(tile).is_some_and(|owner| owner == viewer_faction)
    }
}
