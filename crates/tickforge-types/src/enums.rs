//! Enumeration types shared across the simulation core.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// A tag identifying the terrain kind of a single grid cell.
///
/// Tiles are immutable after world generation; the core reads this value
/// but never writes it during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tile {
    Floor,
    Wall,
    Water,
    Town,
    Camp,
    Sanctuary,
    Forest,
    Desert,
    Swamp,
    Mountain,
    Road,
    Bridge,
    Ruins,
    DungeonEntrance,
    Lava,
}

impl Tile {
    /// Whether an entity can stand on this tile at all.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Wall | Self::Water | Self::Lava)
    }

    /// The per-tile movement cost multiplier applied to the base move
    /// delay. Roads and bridges are cheapest; swamp and mountain are
    /// heaviest, matching the terrain weighting A* uses for long-range
    /// hunts.
    #[must_use]
    pub const fn move_cost_weight(self) -> f64 {
        match self {
            Self::Road | Self::Bridge => 0.5,
            Self::Floor | Self::Town | Self::Camp | Self::Sanctuary | Self::Ruins => 1.0,
            Self::DungeonEntrance => 1.0,
            Self::Forest | Self::Desert => 1.25,
            Self::Swamp | Self::Mountain => 2.0,
            Self::Wall | Self::Water | Self::Lava => f64::INFINITY,
        }
    }
}

// ---------------------------------------------------------------------------
// Action verb
// ---------------------------------------------------------------------------

/// The verb of an `ActionProposal` — what the brain wants the resolver to
/// do on the actor's behalf this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionVerb {
    Rest,
    Move,
    Attack,
    UseItem,
    Loot,
    Harvest,
    UseSkill,
}

// ---------------------------------------------------------------------------
// AI state
// ---------------------------------------------------------------------------

/// The brain's current state. Decision states hand control to the utility
/// evaluator every tick; execution states run a fixed handler until their
/// own exit condition fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    // Decision states.
    Idle,
    Wander,
    RestingInTown,
    GuardCamp,
    // Execution states.
    Hunt,
    Combat,
    Flee,
    Looting,
    Alert,
    Harvesting,
    ReturnToTown,
    ReturnToCamp,
    VisitShop,
    VisitBlacksmith,
    VisitGuild,
    VisitClassHall,
    VisitInn,
    VisitHome,
}

impl AiState {
    /// Decision states re-evaluate goals each tick via the utility
    /// evaluator; execution states run their registered handler.
    #[must_use]
    pub const fn is_decision_state(self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Wander | Self::RestingInTown | Self::GuardCamp
        )
    }
}

// ---------------------------------------------------------------------------
// Equip slot
// ---------------------------------------------------------------------------

/// One of an entity's three equipment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    Armor,
    Accessory,
}

/// All equip slots, in a stable iteration order.
pub const EQUIP_SLOTS: [EquipSlot; 3] = [EquipSlot::Weapon, EquipSlot::Armor, EquipSlot::Accessory];

// ---------------------------------------------------------------------------
// Skill target scope
// ---------------------------------------------------------------------------

/// Which side of the faction line a skill's area affects, selecting
/// buff-on-allies versus debuff-on-enemies semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillTargetScope {
    SelfOrAllyArea,
    EnemyOrEnemyArea,
}

// ---------------------------------------------------------------------------
// Event category
// ---------------------------------------------------------------------------

/// The stable category tag of an observability event. Message text is
/// free-form; category is the part external readers key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Attack,
    Move,
    Rest,
    Spawn,
    Death,
    LevelUp,
    Loot,
    UseItem,
    Harvest,
    Skill,
    Opportunity,
    ChaseSprint,
    Combat,
    Movement,
    /// A quest's progress reached its goal.
    Quest,
}

// ---------------------------------------------------------------------------
// Rejection reason
// ---------------------------------------------------------------------------

/// Why the conflict resolver downgraded a proposal to Rest instead of
/// applying it. Never fatal; purely for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The acting entity is no longer alive by the time its proposal was
    /// reached in resolution order.
    ActorDead,
    /// The proposal's target entity is no longer alive.
    TargetDead,
    /// An earlier proposal this tick already claimed the destination cell.
    CellClaimed,
    /// The destination cell is not walkable or out of grid bounds.
    BlockedCell,
    /// The target is outside the action's required adjacency/range.
    OutOfRange,
    /// The actor lacks the stamina this action costs.
    InsufficientStamina,
    /// The requested skill is still on cooldown.
    SkillOnCooldown,
    /// There is nothing left on the ground at the actor's cell to loot.
    NothingToLoot,
    /// The targeted resource node has no remaining yield or is on
    /// cooldown.
    NothingToHarvest,
    /// The item referenced by a `UseItem` proposal is no longer in the
    /// actor's bag.
    ItemNotHeld,
}

#[cfg(test)]
mod tests {
    use super::{AiState, Tile};

    #[test]
    fn wall_water_lava_are_unwalkable() {
        assert!(!Tile::Wall.is_walkable());
        assert!(!Tile::Water.is_walkable());
        assert!(!Tile::Lava.is_walkable());
        assert!(Tile::Floor.is_walkable());
        assert!(Tile::Road.is_walkable());
    }

    #[test]
    fn road_and_bridge_are_cheapest_walkable_terrain() {
        assert!(Tile::Road.move_cost_weight() < Tile::Floor.move_cost_weight());
        assert!(Tile::Bridge.move_cost_weight() < Tile::Swamp.move_cost_weight());
        assert!(Tile::Mountain.move_cost_weight() > Tile::Forest.move_cost_weight());
    }

    #[test]
    fn decision_vs_execution_partition_is_exhaustive_and_disjoint() {
        let decision = [
            AiState::Idle,
            AiState::Wander,
            AiState::RestingInTown,
            AiState::GuardCamp,
        ];
        let execution = [
            AiState::Hunt,
            AiState::Combat,
            AiState::Flee,
            AiState::Looting,
            AiState::Alert,
            AiState::Harvesting,
            AiState::ReturnToTown,
            AiState::ReturnToCamp,
            AiState::VisitShop,
            AiState::VisitBlacksmith,
            AiState::VisitGuild,
            AiState::VisitClassHall,
            AiState::VisitInn,
            AiState::VisitHome,
        ];
        for state in decision {
            assert!(state.is_decision_state());
        }
        for state in execution {
            assert!(!state.is_decision_state());
        }
    }
}
