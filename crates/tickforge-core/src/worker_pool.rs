//! The bounded-deadline worker pool (component C8).
//!
//! Phase 2 hands every ready actor's id, plus one shared [`Snapshot`], to
//! [`dispatch`], which fans the brain out across a `rayon` pool on a
//! detached thread and polls for a result per actor up to a configured
//! deadline. Anyone who hasn't answered by then gets a synthesized Rest
//! instead of blocking the tick indefinitely -- a slow or stuck brain
//! call degrades one actor's turn, never the whole simulation's cadence.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tickforge_agents::brain::{self, BrainContext};
use tickforge_agents::{AgentsConfig, ItemRegistry, SkillRegistry};
use tickforge_types::{ActionProposal, EntityId};
use tickforge_world::Snapshot;

/// How often the calling thread polls the shared result map while
/// waiting out the deadline.
const POLL_INTERVAL: Duration = Duration::from_micros(200);

/// Runs the brain for every id in `ready` against `snapshot`, returning
/// exactly one proposal per id: whatever the brain produced within
/// `deadline`, or `ActionProposal::rest` for anyone who didn't.
///
/// The snapshot and registries are cheap to clone (all-`Arc` internals),
/// which is what makes handing them to a detached thread safe -- the
/// caller never shares a mutable reference across the thread boundary.
#[must_use]
pub fn dispatch(
    snapshot: &Snapshot,
    ready: &[EntityId],
    config: &AgentsConfig,
    items: &Arc<ItemRegistry>,
    skills: &Arc<SkillRegistry>,
    deadline: Duration,
) -> Vec<ActionProposal> {
    if ready.is_empty() {
        return Vec::new();
    }

    let results: Arc<Mutex<BTreeMap<EntityId, ActionProposal>>> =
        Arc::new(Mutex::new(BTreeMap::new()));

    let worker_snapshot = snapshot.clone();
    let worker_ready = ready.to_vec();
    let worker_config = *config;
    let worker_items = Arc::clone(items);
    let worker_skills = Arc::clone(skills);
    let worker_results = Arc::clone(&results);

    // Detached on purpose: this tick's deadline poll below is the only
    // thing the caller waits on. A brain call that's still running past
    // the deadline finishes harmlessly into a result map nobody reads
    // anymore, rather than holding up the next tick.
    let spawned = std::thread::Builder::new()
        .name("tickforge-worker-pool".into())
        .spawn(move || {
            let ctx = BrainContext {
                config: &worker_config,
                items: &worker_items,
                skills: &worker_skills,
            };
            worker_ready.par_iter().for_each(|&id| {
                let Some(actor) = worker_snapshot.entity(id) else {
                    return;
                };
                let proposal = brain::decide(actor, &worker_snapshot, &ctx);
                if let Ok(mut results) = worker_results.lock() {
                    results.insert(id, proposal);
                }
            });
        });

    if spawned.is_err() {
        return ready.iter().map(|&id| ActionProposal::rest(id)).collect();
    }

    let start = Instant::now();
    loop {
        let done = results.lock().map_or(0, |results| results.len());
        if done >= ready.len() || start.elapsed() >= deadline {
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    let answered = results.lock().map_or_else(|_| BTreeMap::new(), |results| results.clone());
    ready
        .iter()
        .map(|&id| answered.get(&id).copied().unwrap_or_else(|| ActionProposal::rest(id)))
        .collect()
}
