//! Damage resolution shared by `Attack` and `UseSkill`.
//!
//! Every roll here is a stateless, keyed draw from `tickforge_rng` — the
//! same `(world_seed, tick, actor_id)` always resolves to the same hit,
//! crit, and variance, regardless of which worker thread evaluates it.

use tickforge_rng::{roll_unit, Domain};
use tickforge_types::{Entity, SkillDefinition, StatKind};

use crate::config::AgentsConfig;

/// Independent subkeys for the rolls drawn during one attack resolution,
/// so a hit roll and a damage-variance roll never reuse the same draw.
const SUBKEY_EVASION: u64 = 0;
const SUBKEY_VARIANCE: u64 = 1;
const SUBKEY_CRIT: u64 = 2;

/// The outcome of a single damage-dealing hit, before stamina/threat/event
/// bookkeeping (the handler's job, not this module's).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    /// Whether the defender's evasion roll canceled the hit entirely.
    pub evaded: bool,
    /// Whether the crit roll succeeded and `crit_dmg` was applied.
    pub crit: bool,
    /// Final damage, already rounded and floored at 1 (0 if evaded).
    pub damage: i64,
}

/// Rounds to the nearest integer, away from zero on ties, clamping to at
/// least 1 -- damage (and the defense subtracted from it) is never
/// allowed to be non-positive mid-calculation.
#[allow(clippy::cast_possible_truncation)]
fn round_at_least_one(value: f64) -> i64 {
    value.round().max(1.0) as i64
}

#[allow(clippy::cast_possible_truncation)]
fn round_to_i64(value: f64) -> i64 {
    value.round() as i64
}

fn base_damage(atk_power: f64, atk_mult: f64, def_power: f64, def_mult: f64) -> f64 {
    let attack_component = (atk_power * atk_mult).round();
    let defense_component = round_to_i64(def_power * def_mult);
    let defense_reduction = f64::from(i32::try_from(defense_component).unwrap_or(i32::MAX)) / 2.0;
    (attack_component - defense_reduction).max(1.0)
}

/// Resolves a plain weapon attack: evasion, then variance, then crit.
#[must_use]
pub fn resolve_attack(
    attacker: &Entity,
    defender: &Entity,
    world_seed: u64,
    tick: u64,
    config: &AgentsConfig,
) -> HitOutcome {
    let actor = attacker.id.get();
    let evasion = defender.effective_stat(StatKind::Evasion, defender.stats.evasion);
    if roll_unit(world_seed, Domain::Combat, actor, tick, SUBKEY_EVASION) < evasion {
        return HitOutcome {
            evaded: true,
            crit: false,
            damage: 0,
        };
    }

    #[allow(clippy::cast_precision_loss)]
    let atk_power = attacker.effective_stat(StatKind::Atk, attacker.stats.atk as f64);
    #[allow(clippy::cast_precision_loss)]
    let def_power = defender.effective_stat(StatKind::Def, defender.stats.def as f64);
    let mut damage = base_damage(atk_power, 1.0, def_power, 1.0);

    let variance_roll = roll_unit(world_seed, Domain::Combat, actor, tick, SUBKEY_VARIANCE);
    let variance_factor = 1.0 + (variance_roll - 0.5) * config.damage_variance;
    damage *= variance_factor;

    let crit_rate = attacker.effective_stat(StatKind::CritRate, attacker.stats.crit_rate);
    let crit = roll_unit(world_seed, Domain::Combat, actor, tick, SUBKEY_CRIT) < crit_rate;
    if crit {
        let crit_dmg = attacker.effective_stat(StatKind::CritDmg, attacker.stats.crit_dmg);
        damage *= crit_dmg;
    }

    HitOutcome {
        evaded: false,
        crit,
        damage: round_at_least_one(damage),
    }
}

/// Resolves a single target within a skill's area of effect. `distance` is
/// the Manhattan distance from the skill's center; the center target
/// (`distance == 0`, `is_center`) is the only one that can crit, per the
/// design note that AoE splash shouldn't multiply crit variance across
/// every target hit.
#[must_use]
pub fn resolve_skill_hit(
    attacker: &Entity,
    defender: &Entity,
    skill: &SkillDefinition,
    distance: u32,
    is_center: bool,
    world_seed: u64,
    tick: u64,
    subkey_base: u64,
) -> HitOutcome {
    let actor = attacker.id.get();
    #[allow(clippy::cast_precision_loss)]
    let falloff = (1.0 - f64::from(distance) * skill.falloff).max(0.0);
    if falloff <= 0.0 {
        return HitOutcome {
            evaded: false,
            crit: false,
            damage: 0,
        };
    }

    let atk_mult = skill
        .stat_multipliers
        .get(&StatKind::Atk)
        .copied()
        .unwrap_or(1.0);
    let def_mult = 1.0;
    #[allow(clippy::cast_precision_loss)]
    let atk_power = attacker.effective_stat(StatKind::Atk, attacker.stats.atk as f64) * skill.power;
    #[allow(clippy::cast_precision_loss)]
    let def_power = defender.effective_stat(StatKind::Def, defender.stats.def as f64);
    let mut damage = base_damage(atk_power, atk_mult, def_power, def_mult) * falloff;

    let variance_roll = roll_unit(world_seed, Domain::Combat, actor, tick, subkey_base);
    damage *= 1.0 + (variance_roll - 0.5) * 0.2;

    let crit = if is_center {
        let crit_rate = attacker.effective_stat(StatKind::CritRate, attacker.stats.crit_rate);
        let rolled = roll_unit(world_seed, Domain::Combat, actor, tick, subkey_base + 1) < crit_rate;
        if rolled {
            let crit_dmg = attacker.effective_stat(StatKind::CritDmg, attacker.stats.crit_dmg);
            damage *= crit_dmg;
        }
        rolled
    } else {
        false
    };

    HitOutcome {
        evaded: false,
        crit,
        damage: round_at_least_one(damage),
    }
}

/// The fixed opportunity-attack formula used when a `Move` disengages an
/// adjacent hostile under the engagement lock: half attack, no defense
/// mitigation beyond a flat halving, never a crit or evade.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn opportunity_attack_damage(attacker: &Entity, defender: &Entity) -> i64 {
    let atk_power = attacker.effective_stat(StatKind::Atk, attacker.stats.atk as f64);
    let def_power = defender.effective_stat(StatKind::Def, defender.stats.def as f64);
    let half_atk = round_to_i64(atk_power * 0.5);
    let def_reduction = round_to_i64(def_power) / 2;
    (half_atk - def_reduction).max(1)
}

#[cfg(test)]
mod tests {
    use super::{opportunity_attack_damage, resolve_attack};
    use crate::config::AgentsConfig;
    use tickforge_types::{
        AiState, Entity, EntityId, EntityMemory, FactionTag, Personality, Position, StatBlock,
        ThreatTable,
    };

    fn combatant(id: u64, atk: i64, def: i64, evasion: f64) -> Entity {
        Entity {
            id: EntityId::from_raw(id),
            kind: "test".into(),
            position: Position::new(0, 0),
            faction: FactionTag::new("heroes"),
            tier: 0,
            alive: true,
            is_hero: false,
            stats: StatBlock {
                hp: 50,
                max_hp: 50,
                atk,
                def,
                spd: 5,
                luck: 0,
                crit_rate: 0.0,
                crit_dmg: 1.5,
                evasion,
                matk: 0,
                mdef: 0,
                stamina: 20,
                max_stamina: 20,
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
    fn guaranteed_evasion_deals_no_damage() {
        let attacker = combatant(1, 20, 5, 0.0);
        let defender = combatant(2, 10, 5, 1.0);
        let outcome = resolve_attack(&attacker, &defender, 42, 1, &AgentsConfig::default());
        assert!(outcome.evaded);
        assert_eq!(outcome.damage, 0);
    }

    #[test]
    fn damage_is_never_below_one() {
        let attacker = combatant(1, 1, 1, 0.0);
        let defender = combatant(2, 1, 10_000, 0.0);
        let outcome = resolve_attack(&attacker, &defender, 42, 1, &AgentsConfig::default());
        assert!(!outcome.evaded);
        assert!(outcome.damage >= 1);
    }

    #[test]
    fn opportunity_attack_never_crits_and_is_deterministic() {
        let attacker = combatant(1, 20, 4, 0.0);
        let defender = combatant(2, 10, 4, 0.0);
        let a = opportunity_attack_damage(&attacker, &defender);
        let b = opportunity_attack_damage(&attacker, &defender);
        assert_eq!(a, b);
        assert!(a >= 1);
    }

    #[test]
    fn same_seed_and_tick_produce_same_outcome() {
        let attacker = combatant(1, 20, 4, 0.1);
        let defender = combatant(2, 10, 4, 0.1);
        let config = AgentsConfig::default();
        let a = resolve_attack(&attacker, &defender, 7, 3, &config);
        let b = resolve_attack(&attacker, &defender, 7, 3, &config);
        assert_eq!(a, b);
    }
}
