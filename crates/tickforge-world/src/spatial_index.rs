//! The bucketed spatial index over entity positions (component C2).
//!
//! Rebuilt each tick from entity positions during snapshot construction.
//! A pure optimization: `query_radius` returns a superset of the true
//! answer (all ids in cells overlapping the query), and every consumer
//! is expected to apply an exact distance check afterward.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tickforge_types::{EntityId, Position};

/// Tuning constant for the bucket size; near the typical vision range.
/// Neither determinism nor correctness depends on this value, only
/// query performance (see the open question on spatial index cell size
/// in the design notes).
pub const DEFAULT_CELL_SIZE: i32 = 16;

/// A sparse bucket hash from `(x / cell_size, y / cell_size)` to the ids
/// of entities whose position falls in that bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialIndex {
    cell_size: i32,
    buckets: BTreeMap<(i32, i32), Vec<EntityId>>,
}

impl SpatialIndex {
    #[must_use]
    pub fn new(cell_size: i32) -> Self {
        Self {
            cell_size: cell_size.max(1),
            buckets: BTreeMap::new(),
        }
    }

    /// Rebuilds the index from scratch given an iterator of (id,
    /// position) pairs. Called once per tick during snapshot
    /// construction; never mutated incrementally.
    pub fn rebuild<I: IntoIterator<Item = (EntityId, Position)>>(&mut self, entities: I) {
        self.buckets.clear();
        for (id, pos) in entities {
            self.buckets.entry(self.cell_for(pos)).or_default().push(id);
        }
    }

    /// Returns the bucket key a position falls into.
    #[must_use]
    pub fn cell_for(&self, pos: Position) -> (i32, i32) {
        (
            pos.x.div_euclid(self.cell_size),
            pos.y.div_euclid(self.cell_size),
        )
    }

    /// Returns every entity id in a bucket overlapping the Manhattan
    /// radius `r` around `center`. A superset of the exact answer; the
    /// caller performs the exact Manhattan-distance check.
    #[must_use]
    pub fn query_radius(&self, center: Position, r: u32) -> Vec<EntityId> {
        let r = i32::try_from(r).unwrap_or(i32::MAX);
        let (cx, cy) = self.cell_for(center);
        let span = r / self.cell_size + 1;
        let mut ids = Vec::new();
        for dx in -span..=span {
            for dy in -span..=span {
                if let Some(bucket) = self.buckets.get(&(cx + dx, cy + dy)) {
                    ids.extend_from_slice(bucket);
                }
            }
        }
        ids
    }
}
