//! Gameplay tunables for the brain, actions, and bookkeeping in this crate.
//!
//! `tickforge-core::config::SimulationConfig` embeds this struct rather
//! than duplicating its fields, so the whole tunable surface loads from one
//! YAML document while staying owned by the crate that actually consumes
//! each value.

use serde::{Deserialize, Serialize};

/// Per-entity and per-tick gameplay tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// hp / effective_max_hp ratio below which Combat hands off to Flee and
    /// the Flee goal scorer dominates.
    pub flee_hp_ratio: f64,
    /// Ticks a Hunt may run without the target coming into weapon range
    /// before giving up and returning to the entity's previous home-return
    /// state.
    pub mob_chase_give_up_ticks: u32,
    /// Default leash radius for generators that don't set one explicitly.
    pub default_leash_radius: u32,
    /// Ticks added to a hero's `next_act_at` on respawn.
    pub respawn_cooldown_ticks: u64,
    /// Horizon (in ticks) after which a stale `entity_memory` entry is
    /// pruned at the tick boundary. Fixed at 200 per the data model, kept
    /// as a field (not a bare constant) so tests can shrink it.
    pub memory_horizon_ticks: u64,
    /// Multiplicative decay applied to every threat-table entry each tick;
    /// entries below 1.0 afterward are dropped.
    pub threat_decay_rate: f64,
    /// Consecutive adjacent-to-hostile ticks before the engagement lock
    /// (doubled disengage cost + opportunity attack) applies.
    pub engagement_lock_ticks: u32,
    /// Per-tick damage dealt to hostiles standing on hero-faction tiles.
    pub town_aura_damage: i64,
    /// hp restored per tick to heroes resting in town (blocked if an
    /// adjacent hostile is in melee range).
    pub town_passive_heal: i64,
    /// hp restored per tick while in the `RestingInTown` state.
    pub resting_heal_rate: i64,
    /// Natural stamina regen per tick outside resting/visit states.
    pub stamina_regen_base: i64,
    /// Stamina regen per tick while resting or visiting a building.
    pub stamina_regen_resting: i64,
    /// Multiplicative stat bonus applied to an entity standing on
    /// enemy-faction territory while the `TerritoryDebuff` is active.
    pub territory_debuff_atk_mult: f64,
    /// Duration (ticks) a freshly applied `TerritoryDebuff` carries.
    pub territory_debuff_duration: i32,
    /// Manhattan radius within which a territorial intrusion broadcasts
    /// Alert to same-faction defenders (falls back to a region's own
    /// `alert_radius` when set).
    pub default_alert_radius: u32,
    /// Highest level an entity's `StatBlock.level` may reach.
    pub max_level: u32,
    /// Relative damage variance applied on Attack and `UseSkill`, e.g. 0.2
    /// means damage is rolled uniformly within plus-or-minus 10% of base.
    pub damage_variance: f64,
    /// Fraction by which a basic attack must be beaten (in expected AoE
    /// value) before Combat proposes `UseSkill` over Attack.
    pub skill_over_attack_margin: f64,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            flee_hp_ratio: 0.3,
            mob_chase_give_up_ticks: 20,
            default_leash_radius: 12,
            respawn_cooldown_ticks: 10,
            memory_horizon_ticks: 200,
            threat_decay_rate: 0.05,
            engagement_lock_ticks: 2,
            town_aura_damage: 4,
            town_passive_heal: 2,
            resting_heal_rate: 5,
            stamina_regen_base: 1,
            stamina_regen_resting: 3,
            territory_debuff_atk_mult: 0.85,
            territory_debuff_duration: 10,
            default_alert_radius: 10,
            max_level: 60,
            damage_variance: 0.2,
            skill_over_attack_margin: 1.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AgentsConfig;

    #[test]
    fn default_flee_ratio_is_below_half_health() {
        assert!(AgentsConfig::default().flee_hp_ratio < 0.5);
    }

    #[test]
    fn default_memory_horizon_matches_data_model() {
        assert_eq!(AgentsConfig::default().memory_horizon_ticks, 200);
    }
}
