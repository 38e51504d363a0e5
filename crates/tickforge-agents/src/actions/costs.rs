//! Stamina and `next_act_at` cost tables for each action verb.
//!
//! Costs are looked up here rather than inlined in the handlers so the
//! resolver can reject on insufficient stamina before any handler runs.

use tickforge_types::{ActionProposal, ActionVerb, Entity, Position};
use tickforge_world::Grid;

use super::ActionContext;

/// Stamina spent issuing a `Move`.
pub const MOVE_STAMINA_COST: i64 = 1;
/// Stamina spent issuing an `Attack`.
pub const ATTACK_STAMINA_COST: i64 = 3;
/// Stamina spent issuing a `Loot`.
pub const LOOT_STAMINA_COST: i64 = 0;
/// Stamina spent issuing a `Harvest`.
pub const HARVEST_STAMINA_COST: i64 = 1;
/// Stamina spent issuing a `UseItem`.
pub const USE_ITEM_STAMINA_COST: i64 = 0;

/// Stamina cost for a verb that doesn't need extra context. `UseSkill`
/// pulls its cost from the skill's own definition instead.
#[must_use]
pub fn stamina_cost(verb: ActionVerb) -> i64 {
    match verb {
        ActionVerb::Rest => 0,
        ActionVerb::Move => MOVE_STAMINA_COST,
        ActionVerb::Attack => ATTACK_STAMINA_COST,
        ActionVerb::UseItem => USE_ITEM_STAMINA_COST,
        ActionVerb::Loot => LOOT_STAMINA_COST,
        ActionVerb::Harvest => HARVEST_STAMINA_COST,
        ActionVerb::UseSkill => 0,
    }
}

/// The `next_act_at` delta for every verb except `Move` (whose cost is
/// terrain-dependent, see [`move_tick_cost`]).
#[must_use]
pub const fn base_tick_cost(_verb: ActionVerb) -> f64 {
    1.0
}

/// Stamina cost for a proposal, resolving `UseSkill`'s cost from the
/// acting entity's (currently only) equipped skill's own definition.
/// Falls back to 0 for an entity with no skill or an unrecognized skill
/// tag -- validation rejects both cases before any cost is charged.
#[must_use]
pub fn stamina_cost_for(actor: &Entity, proposal: &ActionProposal, ctx: &ActionContext<'_>) -> i64 {
    if proposal.verb != ActionVerb::UseSkill {
        return stamina_cost(proposal.verb);
    }
    let Some(instance) = actor.skills.first() else {
        return 0;
    };
    ctx.skills.get(&instance.skill_tag).map_or(0, |def| def.stamina_cost)
}

/// The `next_act_at` delta for a `Move` onto `dest`: the destination
/// tile's move-cost weight, doubled if `mover` is under the engagement
/// lock (it is disengaging from adjacent combat).
#[must_use]
pub fn move_tick_cost(mover: &Entity, grid: &Grid, dest: Position, engagement_lock_ticks: u32) -> f64 {
    let weight = grid.get(dest).map_or(1.0, |t| t.move_cost_weight());
    if mover.engaged_ticks >= engagement_lock_ticks {
        weight * 2.0
    } else {
        weight
    }
}

#[cfg(test)]
mod tests {
    use super::{move_tick_cost, stamina_cost};
    use tickforge_types::{
        ActionVerb, AiState, Entity, EntityId, EntityMemory, FactionTag, Personality, Position,
        StatBlock, ThreatTable, Tile,
    };
    use tickforge_world::Grid;

    fn test_entity(engaged_ticks: u32) -> Entity {
        Entity {
            id: EntityId::from_raw(1),
            kind: "goblin".into(),
            position: Position::new(0, 0),
            faction: FactionTag::new("monsters"),
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
            engaged_ticks,
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
    fn move_cost_doubles_under_engagement_lock() {
        let grid = Grid::filled(4, 4, Tile::Floor);
        let free = test_entity(0);
        let locked = test_entity(5);
        let free_cost = move_tick_cost(&free, &grid, Position::new(1, 0), 2);
        let locked_cost = move_tick_cost(&locked, &grid, Position::new(1, 0), 2);
        assert!((locked_cost - free_cost * 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn move_cost_follows_terrain_weight() {
        let grid = Grid::filled(4, 4, Tile::Swamp);
        let entity = test_entity(0);
        let cost = move_tick_cost(&entity, &grid, Position::new(1, 0), 2);
        assert!((cost - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn attack_costs_more_stamina_than_move() {
        assert!(stamina_cost(ActionVerb::Attack) > stamina_cost(ActionVerb::Move));
    }
}
