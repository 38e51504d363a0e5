//! Core entity and value-object structs shared across the simulation core.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{AiState, EquipSlot, EventCategory, SkillTargetScope, Tile};
use crate::ids::{ChestId, EntityId, EventId, ItemId, ResourceNodeId};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// An integer grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (taxicab) distance, the distance metric used throughout
    /// perception, pathing heuristics, and vision checks.
    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.saturating_add(dy)
    }

    #[must_use]
    pub const fn is_adjacent_to(self, other: Self) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        dx <= 1 && dy <= 1 && !(dx == 0 && dy == 0)
    }
}

// ---------------------------------------------------------------------------
// Faction
// ---------------------------------------------------------------------------

/// A faction tag. Content (which tiles belong to which faction, who is
/// hostile to whom) lives in the faction registry; this is just the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactionTag(pub String);

impl FactionTag {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

impl core::fmt::Display for FactionTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// An entity's named stat, used as the key for additive/multiplicative
/// modifiers from equipment and status effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Atk,
    Def,
    Spd,
    Luck,
    CritRate,
    CritDmg,
    Evasion,
    Matk,
    Mdef,
    MaxHp,
    MaxStamina,
    VisionRange,
    WeaponRange,
}

/// An entity's base stats, before equipment bonuses and status-effect
/// modifiers are applied. Effective stats are always derived on demand
/// from this plus the entity's equipment and active effects; they are
/// never cached on the entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub hp: i64,
    pub max_hp: i64,
    pub atk: i64,
    pub def: i64,
    pub spd: i64,
    pub luck: i64,
    pub crit_rate: f64,
    pub crit_dmg: f64,
    pub evasion: f64,
    pub matk: i64,
    pub mdef: i64,
    pub stamina: i64,
    pub max_stamina: i64,
    pub level: u32,
    pub xp: u64,
    pub xp_to_next: u64,
    pub gold: u64,
}

// ---------------------------------------------------------------------------
// Status effects
// ---------------------------------------------------------------------------

/// The source/identity of an active status effect. `TerritoryDebuff` is a
/// fixed core mechanic (applied while standing on enemy terrain); `Named`
/// covers the open set of skill-granted buffs and debuffs, whose exact
/// magnitudes are content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEffectKind {
    TerritoryDebuff,
    Named(String),
}

/// An active, timed modifier on an entity's effective stats and/or hp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusEffectKind,
    /// Ticks remaining before expiry; `-1` marks a permanent effect.
    pub remaining_ticks: i32,
    pub hp_per_tick: i64,
    pub stat_multipliers: BTreeMap<StatKind, f64>,
    pub stat_additive: BTreeMap<StatKind, i64>,
    pub scope: SkillTargetScope,
}

impl StatusEffect {
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        self.remaining_ticks == -1
    }
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// A learned skill instance on an entity. The skill's mechanics (power,
/// range, radius, cooldown, costs) are content looked up by `skill_tag`
/// from the skill registry; this struct is purely the per-entity runtime
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillInstance {
    pub skill_tag: String,
    pub cooldown_remaining: u32,
    pub mastery: u32,
    pub times_used: u32,
}

/// Static skill mechanics, looked up by tag from the embedder-provided
/// skill registry. Exact numeric content is an opaque data-registry
/// concern; the shape below is the minimum the resolver needs to apply
/// `UseSkill`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub tag: String,
    pub power: f64,
    pub range: u32,
    /// `0` for single-target; `>0` for an area-of-effect radius.
    pub radius: u32,
    pub falloff: f64,
    pub base_cooldown: u32,
    pub stamina_cost: i64,
    pub scope: SkillTargetScope,
    pub stat_multipliers: BTreeMap<StatKind, f64>,
    pub stat_additive: BTreeMap<StatKind, i64>,
    pub effect_duration: i32,
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A stack of one item tag held in a bag, home storage, or on the ground.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: ItemId,
    pub item_tag: String,
    pub quantity: u32,
}

/// Static item mechanics looked up by tag. Power is a single comparable
/// heuristic used for auto-equip decisions on Loot; effect fields drive
/// `UseItem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub tag: String,
    pub equip_slot: Option<EquipSlot>,
    pub power: i64,
    pub heal_amount: i64,
    pub stat_bonuses: BTreeMap<StatKind, i64>,
}

/// An entity's bag, equipment, and carry capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub bag: Vec<ItemStack>,
    pub equipment: BTreeMap<EquipSlot, ItemStack>,
    pub capacity: u32,
}

impl Inventory {
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            bag: Vec::new(),
            equipment: BTreeMap::new(),
            capacity,
        }
    }

    #[must_use]
    pub fn bag_len(&self) -> usize {
        self.bag.len()
    }

    #[must_use]
    pub fn has_space(&self) -> bool {
        u32::try_from(self.bag.len()).unwrap_or(u32::MAX) < self.capacity
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// What an entity last observed about one other entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMemoryEntry {
    pub last_position: Position,
    pub last_kind: String,
    pub last_hp: i64,
    pub last_max_hp: i64,
    pub last_tick_seen: u64,
    pub visible_now: bool,
}

/// An entity's persistent recollection of terrain and other entities.
/// `terrain_memory` only ever grows; `entity_memory` is pruned for dead,
/// absent, or stale (> 200 tick) entries at the tick boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityMemory {
    pub terrain_memory: BTreeMap<Position, Tile>,
    pub entity_memory: BTreeMap<EntityId, EntityMemoryEntry>,
}

// ---------------------------------------------------------------------------
// Threat table
// ---------------------------------------------------------------------------

/// Per-attacker threat accrued on an entity, used to pick the highest-
/// threat visible enemy and decayed every tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreatTable(pub BTreeMap<EntityId, f64>);

impl ThreatTable {
    pub fn add(&mut self, attacker: EntityId, amount: f64) {
        *self.0.entry(attacker).or_insert(0.0) += amount;
    }
}

// ---------------------------------------------------------------------------
// Personality
// ---------------------------------------------------------------------------

/// Additive trait bonuses applied on top of a goal scorer's base score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub aggression: f64,
    pub caution: f64,
    pub greed: f64,
    pub sociability: f64,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            aggression: 0.0,
            caution: 0.0,
            greed: 0.0,
            sociability: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A single actor in the world: a hero, a mob, an NPC. The authoritative
/// per-entity record owned by `WorldState`'s entity map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: String,
    pub position: Position,
    pub faction: FactionTag,
    pub tier: u8,
    pub alive: bool,
    pub is_hero: bool,
    pub stats: StatBlock,
    pub class_tag: Option<String>,
    pub skills: Vec<SkillInstance>,
    pub status_effects: Vec<StatusEffect>,
    pub personality: Personality,
    pub inventory: Option<Inventory>,
    pub home_storage: Option<Inventory>,
    pub ai_state: AiState,
    pub next_act_at: f64,
    pub memory: EntityMemory,
    pub engaged_ticks: u32,
    pub threat_table: ThreatTable,
    pub cached_path: Option<Vec<Position>>,
    pub cached_path_target: Option<Position>,
    pub combat_target_id: Option<EntityId>,
    pub loot_progress: u32,
    pub loot_duration: u32,
    pub home_pos: Position,
    pub vision_range: u32,
    pub weapon_range: u32,
    pub leash_radius: Option<u32>,
}

impl Entity {
    /// Effective stat = `base + sum(status-effect additive modifiers) *
    /// product(status-effect multiplicative modifiers)`. Equipment bonuses
    /// are folded in by callers that resolve the item registry (this crate
    /// has no registry access); never stored, always recomputed.
    #[must_use]
    pub fn effective_stat(&self, kind: StatKind, base: f64) -> f64 {
        let mut additive = 0.0;
        let mut multiplier = 1.0;
        for effect in &self.status_effects {
            if let Some(add) = effect.stat_additive.get(&kind) {
                additive += *add as f64;
            }
            if let Some(mult) = effect.stat_multipliers.get(&kind) {
                multiplier *= mult;
            }
        }
        (base + additive) * multiplier
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn effective_max_hp(&self) -> i64 {
        self.effective_stat(StatKind::MaxHp, self.stats.max_hp as f64).round() as i64
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hp_ratio(&self) -> f64 {
        let max_hp = self.effective_max_hp();
        if max_hp <= 0 {
            0.0
        } else {
            (self.stats.hp as f64) / (max_hp as f64)
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stamina_ratio(&self) -> f64 {
        if self.stats.max_stamina <= 0 {
            0.0
        } else {
            (self.stats.stamina as f64) / (self.stats.max_stamina as f64)
        }
    }

    /// The authoritative liveness check: `hp > 0`, always, never the
    /// `alive` field on its own. `alive` trails one bookkeeping phase
    /// behind `hp` (it's only corrected when death cleanup removes or
    /// respawns the entity), so a target dropped to zero hp earlier in
    /// the same tick's resolve phase must still read as dead here.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.stats.hp > 0
    }
}

// ---------------------------------------------------------------------------
// World content: resource nodes, chests, buildings, regions
// ---------------------------------------------------------------------------

/// A harvestable resource node (tree, ore vein, etc.).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: ResourceNodeId,
    pub position: Position,
    pub resource_tag: String,
    pub remaining: u32,
    pub max_harvests: u32,
    pub cooldown_remaining: u32,
    pub respawn_cooldown: u32,
    pub yield_item_tag: String,
}

/// A static treasure chest placed during world generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chest {
    pub id: ChestId,
    pub position: Position,
    pub loot: Vec<ItemStack>,
    pub opened: bool,
}

/// The functional kind of a static building, used by visit-* AI handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    Shop,
    Blacksmith,
    Guild,
    ClassHall,
    Inn,
    Home,
}

/// A static building placed during world generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub position: Position,
    pub kind: BuildingKind,
    pub faction: FactionTag,
}

/// A named territorial region with an owning faction, used for the alert
/// radius broadcast in territory bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub faction: FactionTag,
    pub min_corner: Position,
    pub max_corner: Position,
    pub alert_radius: u32,
}

impl Region {
    #[must_use]
    pub const fn contains(&self, pos: Position) -> bool {
        pos.x >= self.min_corner.x
            && pos.x <= self.max_corner.x
            && pos.y >= self.min_corner.y
            && pos.y <= self.max_corner.y
    }
}

// ---------------------------------------------------------------------------
// Quests
// ---------------------------------------------------------------------------

/// The condition a quest tracks progress against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestKind {
    Kill,
    Harvest,
    Loot,
    Explore,
}

/// A per-entity quest, matched against this tick's events in bookkeeping
/// step (j). Numeric goals and rewards are content; the progress
/// tracking mechanism is core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub quest_tag: String,
    pub owner: EntityId,
    pub kind: QuestKind,
    pub target_tag: String,
    pub progress: u32,
    pub goal: u32,
    pub completed_at_tick: Option<u64>,
}

impl Quest {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.progress >= self.goal
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A single append-only observability event. Wire-exact: `category` is
/// stable, `message` is free-form text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub tick: u64,
    pub category: EventCategory,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::{
        Entity, EntityMemory, FactionTag, Personality, Position, StatBlock, StatKind, StatusEffect,
        StatusEffectKind, ThreatTable,
    };
    use crate::enums::{AiState, SkillTargetScope};
    use crate::ids::EntityId;
    use std::collections::BTreeMap;

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = Position::new(2, 2);
        let b = Position::new(5, 6);
        assert_eq!(a.manhattan_distance(b), b.manhattan_distance(a));
        assert_eq!(a.manhattan_distance(b), 7);
    }

    #[test]
    fn adjacency_excludes_self_and_requires_neighbor() {
        let center = Position::new(0, 0);
        assert!(!center.is_adjacent_to(center));
        assert!(center.is_adjacent_to(Position::new(1, 0)));
        assert!(center.is_adjacent_to(Position::new(1, 1)));
        assert!(!center.is_adjacent_to(Position::new(2, 0)));
    }

    fn make_stats(hp: i64, max_hp: i64) -> StatBlock {
        StatBlock {
            hp,
            max_hp,
            atk: 10,
            def: 1,
            spd: 5,
            luck: 0,
            crit_rate: 0.05,
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
        }
    }

    fn make_entity(status_effects: Vec<StatusEffect>) -> Entity {
        Entity {
            id: EntityId::from_raw(1),
            kind: "goblin".into(),
            position: Position::new(0, 0),
            faction: FactionTag::new("hostile"),
            tier: 0,
            alive: true,
            is_hero: false,
            stats: make_stats(15, 15),
            class_tag: None,
            skills: Vec::new(),
            status_effects,
            personality: Personality::default(),
            inventory: None,
            home_storage: None,
            ai_state: AiState::Wander,
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
    fn effective_stat_applies_status_effect_modifiers() {
        let mut additive = BTreeMap::new();
        additive.insert(StatKind::Atk, -2);
        let mut mult = BTreeMap::new();
        mult.insert(StatKind::Atk, 0.5);
        let debuff = StatusEffect {
            kind: StatusEffectKind::TerritoryDebuff,
            remaining_ticks: 5,
            hp_per_tick: 0,
            stat_multipliers: mult,
            stat_additive: additive,
            scope: SkillTargetScope::EnemyOrEnemyArea,
        };

        let entity = make_entity(vec![debuff]);
        let effective_atk = entity.effective_stat(StatKind::Atk, entity.stats.atk as f64);
        assert!((effective_atk - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_effects_leaves_stat_unchanged() {
        let entity = make_entity(Vec::new());
        let effective_atk = entity.effective_stat(StatKind::Atk, entity.stats.atk as f64);
        assert!((effective_atk - 10.0).abs() < f64::EPSILON);
    }
}
