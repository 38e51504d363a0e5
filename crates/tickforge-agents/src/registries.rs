//! Placeholder content registries, keyed by string tag.
//!
//! Item and skill *mechanics* (power, cooldowns, stat bonuses) are opaque
//! data supplied by the embedder, not core design — the core only needs a
//! lookup from tag to definition. These thin wrappers are that lookup;
//! populating them with real content is entirely out of this crate's
//! scope.

use std::collections::BTreeMap;

use tickforge_types::{ItemDefinition, SkillDefinition};

/// Lookup from item tag to its static mechanics.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry(BTreeMap<String, ItemDefinition>);

impl ItemRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: ItemDefinition) {
        self.0.insert(item.tag.clone(), item);
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&ItemDefinition> {
        self.0.get(tag)
    }
}

/// Lookup from skill tag to its static mechanics.
#[derive(Debug, Clone, Default)]
pub struct SkillRegistry(BTreeMap<String, SkillDefinition>);

impl SkillRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, skill: SkillDefinition) {
        self.0.insert(skill.tag.clone(), skill);
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&SkillDefinition> {
        self.0.get(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemRegistry, SkillRegistry};
    use std::collections::BTreeMap;
    use tickforge_types::{ItemDefinition, SkillDefinition, SkillTargetScope};

    #[test]
    fn item_registry_round_trips_by_tag() {
        let mut registry = ItemRegistry::new();
        registry.insert(ItemDefinition {
            tag: "potion_minor".into(),
            equip_slot: None,
            power: 0,
            heal_amount: 20,
            stat_bonuses: BTreeMap::new(),
        });
        assert_eq!(registry.get("potion_minor").map(|i| i.heal_amount), Some(20));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn skill_registry_round_trips_by_tag() {
        let mut registry = SkillRegistry::new();
        registry.insert(SkillDefinition {
            tag: "fireball".into(),
            power: 12.0,
            range: 5,
            radius: 2,
            falloff: 0.25,
            base_cooldown: 4,
            stamina_cost: 6,
            scope: SkillTargetScope::EnemyOrEnemyArea,
            stat_multipliers: BTreeMap::new(),
            stat_additive: BTreeMap::new(),
            effect_duration: -1,
        });
        assert_eq!(registry.get("fireball").map(|s| s.radius), Some(2));
    }
}
