//! The utility evaluator: nine goal scorers, each naming a target
//! execution state, sampled by weight once their scores are ranked.
//!
//! Every scorer is monotonic in its stated driver — colder wording:
//! feed it a worse situation and the score never goes down. That
//! contract is what lets [`evaluate`] treat all nine the same way
//! regardless of what they individually measure.

use tickforge_rng::{roll_unit, Domain};
use tickforge_types::{AiState, Entity};
use tickforge_world::{Perception, Snapshot};

use crate::config::AgentsConfig;

/// Scores below this are dropped before the top-three weighted sample,
/// so an entity with nothing worth doing stays idle rather than
/// twitching toward whichever goal scored a residual 0.01.
const SCORE_THRESHOLD: f64 = 0.05;

struct ScoredGoal {
    target_state: AiState,
    score: f64,
}

/// Runs every registered scorer, keeps the top three above threshold,
/// and samples one by weight using a single `AiDecision` draw. Falls
/// back to `Wander` if nothing clears the threshold.
#[must_use]
pub fn evaluate(actor: &Entity, perception: &Perception, snapshot: &Snapshot, config: &AgentsConfig) -> AiState {
    let mut scored: Vec<ScoredGoal> = vec![
        ScoredGoal { target_state: AiState::Hunt, score: combat_score(actor, perception) },
        ScoredGoal { target_state: AiState::Flee, score: flee_score(actor, config) },
        ScoredGoal { target_state: AiState::Wander, score: explore_score(actor, perception) },
        ScoredGoal { target_state: AiState::Looting, score: loot_score(actor, perception) },
        ScoredGoal { target_state: AiState::VisitShop, score: trade_score(actor) },
        ScoredGoal { target_state: AiState::RestingInTown, score: rest_score(actor, config) },
        ScoredGoal { target_state: AiState::VisitBlacksmith, score: craft_score(actor) },
        ScoredGoal { target_state: AiState::VisitGuild, score: social_score(actor) },
        ScoredGoal { target_state: AiState::GuardCamp, score: guard_score(actor, perception, snapshot) },
    ];
    scored.retain(|g| g.score > SCORE_THRESHOLD);
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(3);

    let Some(winner) = sample_weighted(&scored, actor, snapshot) else {
        return AiState::Wander;
    };
    winner
}

fn sample_weighted(scored: &[ScoredGoal], actor: &Entity, snapshot: &Snapshot) -> Option<AiState> {
    let total: f64 = scored.iter().map(|g| g.score).sum();
    if total <= 0.0 {
        return None;
    }
    let roll = roll_unit(snapshot.world_seed, Domain::AiDecision, actor.id.get(), snapshot.tick, 0) * total;
    let mut cumulative = 0.0;
    for goal in scored {
        cumulative += goal.score;
        if roll < cumulative {
            return Some(goal.target_state);
        }
    }
    scored.last().map(|g| g.target_state)
}

fn combat_score(actor: &Entity, perception: &Perception) -> f64 {
    if perception.highest_threat_enemy.or(perception.nearest_enemy).is_none() {
        return 0.0;
    }
    let base = 0.55 + actor.hp_ratio() * 0.35;
    (base + actor.personality.aggression * 0.2).clamp(0.0, 1.0)
}

fn flee_score(actor: &Entity, config: &AgentsConfig) -> f64 {
    let deficit = (config.flee_hp_ratio - actor.hp_ratio()).max(0.0);
    (deficit * 2.5 + actor.personality.caution * 0.1).clamp(0.0, 1.0)
}

fn explore_score(actor: &Entity, perception: &Perception) -> f64 {
    if perception.nearest_enemy.is_some() {
        return 0.05;
    }
    (0.3 + actor.hp_ratio() * 0.2 + actor.stamina_ratio() * 0.2).clamp(0.0, 1.0)
}

fn loot_score(actor: &Entity, perception: &Perception) -> f64 {
    if perception.ground_loot_nearby.is_empty() {
        return 0.0;
    }
    let has_space = actor.inventory.as_ref().is_some_and(tickforge_types::Inventory::has_space);
    if !has_space {
        return 0.0;
    }
    let nearest = perception
        .ground_loot_nearby
        .iter()
        .map(|pos| actor.position.manhattan_distance(*pos))
        .min()
        .unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let proximity = 1.0 / (1.0 + f64::from(nearest));
    (0.3 + proximity * 0.5 + actor.personality.greed * 0.2).clamp(0.0, 1.0)
}

fn trade_score(actor: &Entity) -> f64 {
    let Some(inventory) = actor.inventory.as_ref() else {
        return 0.0;
    };
    if inventory.capacity == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let fullness = f64::from(u32::try_from(inventory.bag_len()).unwrap_or(u32::MAX)) / f64::from(inventory.capacity);
    (fullness * 0.6 + actor.personality.greed * 0.2).clamp(0.0, 1.0)
}

fn rest_score(actor: &Entity, config: &AgentsConfig) -> f64 {
    let hp_need = (1.0 - actor.hp_ratio()).max(0.0);
    let stamina_need = (1.0 - actor.stamina_ratio()).max(0.0);
    let _ = config;
    (hp_need * 0.5 + stamina_need * 0.3).clamp(0.0, 1.0)
}

fn craft_score(actor: &Entity) -> f64 {
    let Some(inventory) = actor.inventory.as_ref() else {
        return 0.0;
    };
    if inventory.bag.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let materials = f64::from(u32::try_from(inventory.bag_len()).unwrap_or(u32::MAX)) / f64::from(inventory.capacity.max(1));
    (materials * 0.3).clamp(0.0, 1.0)
}

fn social_score(actor: &Entity) -> f64 {
    (actor.personality.sociability * 0.4).clamp(0.0, 1.0)
}

fn guard_score(actor: &Entity, perception: &Perception, snapshot: &Snapshot) -> f64 {
    if actor.is_hero {
        return 0.0;
    }
    let _ = snapshot;
    if !perception.on_home_territory {
        return 0.0;
    }
    let distance = actor.position.manhattan_distance(actor.home_pos);
    #[allow(clippy::cast_precision_loss)]
    let proximity = 1.0 / (1.0 + f64::from(distance));
    (0.25 + proximity * 0.4).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::{combat_score, flee_score};
    use crate::config::AgentsConfig;
    use std::sync::Arc;
    use tickforge_types::{
        AiState, Entity, EntityId, EntityMemory, FactionTag, Personality, Position, StatBlock,
        ThreatTable,
    };
    use tickforge_world::{perception, Grid, Snapshot, WorldState};

    fn test_entity(hp: i64, max_hp: i64) -> Entity {
        Entity {
            id: EntityId::from_raw(1),
            kind: "test".into(),
            position: Position::new(0, 0),
            faction: FactionTag::new("heroes"),
            tier: 0,
            alive: true,
            is_hero: false,
            stats: StatBlock {
                hp,
                max_hp,
                atk: 5,
                def: 2,
                spd: 1,
                luck: 0,
                crit_rate: 0.0,
                crit_dmg: 1.5,
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
    fn flee_score_rises_as_hp_drops_below_threshold() {
        let config = AgentsConfig::default();
        let healthy = flee_score(&test_entity(50, 50), &config);
        let hurt = flee_score(&test_entity(5, 50), &config);
        assert!(hurt > healthy);
    }

    #[test]
    fn combat_score_is_zero_with_no_visible_enemy() {
        let world = WorldState::new(1, Grid::filled(10, 10, tickforge_types::Tile::Floor));
        let grid = Arc::new(world.grid.clone());
        let snapshot = Snapshot::build(&world, grid);
        let actor = test_entity(50, 50);
        let view = perception::build(&snapshot, &actor);
        assert_eq!(combat_score(&actor, &view), 0.0);
    }
}
