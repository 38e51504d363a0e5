//! Shared type definitions for the Tickforge simulation core.
//!
//! This crate is the single source of truth for data shared across the
//! workspace: entity identifiers, enumerations, the entity and world-
//! content structs, and the action-proposal type the AI brain hands to
//! the conflict resolver.
//!
//! # Modules
//!
//! - [`ids`] -- monotonic id newtypes and their allocators
//! - [`enums`] -- closed tag enumerations (tile, action verb, ai state, ...)
//! - [`structs`] -- entity, inventory, memory, and world-content structs
//! - [`proposal`] -- the `ActionProposal` the brain hands to the resolver

pub mod enums;
pub mod ids;
pub mod proposal;
pub mod structs;

pub use enums::{
    ActionVerb, AiState, EquipSlot, EventCategory, RejectionReason, SkillTargetScope, Tile,
    EQUIP_SLOTS,
};
pub use ids::{ChestId, EntityId, EventId, IdAllocator, ItemId, ResourceNodeId};
pub use proposal::{ActionProposal, ProposalTarget};
pub use structs::{
    Building, BuildingKind, Chest, Entity, EntityMemory, EntityMemoryEntry, EventRecord,
    FactionTag, Inventory, ItemDefinition, ItemStack, Personality, Position, Quest, QuestKind,
    Region, ResourceNode, SkillDefinition, SkillInstance, StatBlock, StatKind, StatusEffect,
    StatusEffectKind, ThreatTable,
};
