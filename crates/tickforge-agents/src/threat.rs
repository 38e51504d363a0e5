//! Threat-table decay (bookkeeping step i).
//!
//! Every attacker's standing in a defender's threat table decays a
//! little each tick; once it falls below 1.0, or the attacker is gone
//! from the world, the entry is dropped rather than lingering forever.

use tickforge_types::EntityId;
use tickforge_world::WorldState;

use crate::config::AgentsConfig;

const MIN_THREAT: f64 = 1.0;

/// Decays every entity's threat table in place.
pub fn apply(world: &mut WorldState, config: &AgentsConfig) {
    let alive: std::collections::BTreeSet<EntityId> =
        world.entities.values().filter(|e| e.is_alive()).map(|e| e.id).collect();
    let decay = 1.0 - config.threat_decay_rate;

    for entity in world.entities.values_mut() {
        entity.threat_table.0.retain(|attacker_id, threat| {
            *threat *= decay;
            *threat >= MIN_THREAT && alive.contains(attacker_id)
        });
    }
}
