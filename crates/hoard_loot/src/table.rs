//! # Loot Table Instance
//!
//! The owner-side view of one loot-table asset: its current loot tree, its
//! disablement overlay, and the properties it publishes to scripts.

use std::sync::Arc;

use hoard_core::RandomSource;

use crate::catalogue::LootTableAsset;
use crate::condition::{ConditionEvaluator, Properties, PropertyValue};
use crate::instance::{LootInstance, LootOwner};
use crate::inventory::{Inventory, ItemRules};
use crate::layers::TableLayer;
use crate::overlay::DisablementOverlay;
use crate::schema::{ContentPreset, LootDrop, LootSchema};

/// Property listing every preset the table can emit.
pub const ITEMS_PROPERTY: &str = "items";
/// Property listing the currently disabled component ids.
pub const DISABLED_IDS_PROPERTY: &str = "disableByComponentId";
/// Property listing the currently disabled component tags.
pub const DISABLED_TAGS_PROPERTY: &str = "disableByComponentTag";

/// A loot table bound to an owner.
#[derive(Clone, Debug)]
pub struct LootTableInstance {
    name: String,
    loot: Option<Arc<LootSchema>>,
    overlay: DisablementOverlay,
    properties: Properties,
}

impl LootTableInstance {
    /// Instantiates an asset by replaying its layers.
    ///
    /// `parent` supplies properties the table does not define itself
    /// (typically the world).
    #[must_use]
    pub fn new(asset: &LootTableAsset, parent: Option<Arc<Properties>>) -> Self {
        let mut instance = Self {
            name: asset.name().to_string(),
            loot: None,
            overlay: DisablementOverlay::new(),
            properties: parent.map_or_else(Properties::new, Properties::with_parent),
        };
        for layer in asset.layers().iter() {
            instance.apply_layer(layer);
        }
        instance.publish();
        instance
    }

    /// Asset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current loot tree, if any base layer set one.
    #[must_use]
    pub fn loot(&self) -> Option<&Arc<LootSchema>> {
        self.loot.as_ref()
    }

    /// The current disablement state.
    #[must_use]
    pub fn overlay(&self) -> &DisablementOverlay {
        &self.overlay
    }

    /// Properties visible to this table's conditions.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Mutable access for owner-specific properties.
    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    /// Applies one more configuration layer (e.g. an owner override).
    pub fn apply_layer(&mut self, layer: &TableLayer) {
        layer.apply(&mut self.loot, &mut self.overlay);
        self.publish();
    }

    /// Every preset the current tree can emit.
    #[must_use]
    pub fn referenced_presets(&self) -> Vec<&ContentPreset> {
        self.loot
            .as_deref()
            .map(LootSchema::referenced_presets)
            .unwrap_or_default()
    }

    /// Runs one generation pass.
    ///
    /// A table without a loot tree generates nothing and draws nothing.
    pub fn evaluate<R>(&self, evaluator: &dyn ConditionEvaluator, rng: &mut R) -> Vec<LootDrop>
    where
        R: RandomSource + ?Sized,
    {
        let Some(schema) = self.loot.as_deref() else {
            return Vec::new();
        };
        let owner = LootOwner {
            overlay: &self.overlay,
            evaluator,
            properties: &self.properties,
        };
        LootInstance::bind(schema, owner).evaluate(rng)
    }

    /// Generates and places loot in one step, returning what did not fit.
    ///
    /// Generation draws come first, then the slot shuffle, on the same stream.
    pub fn fill<R>(
        &self,
        evaluator: &dyn ConditionEvaluator,
        inventory: &mut Inventory,
        shuffle: bool,
        rules: &dyn ItemRules,
        rng: &mut R,
    ) -> Vec<LootDrop>
    where
        R: RandomSource + ?Sized,
    {
        let drops = self.evaluate(evaluator, rng);
        inventory.fill(drops, shuffle, rng, rules)
    }

    fn publish(&mut self) {
        let items = PropertyValue::text_list(
            self.referenced_presets()
                .into_iter()
                .map(|p| p.as_str().to_string())
                .collect::<Vec<_>>(),
        );
        let ids = PropertyValue::text_list(self.overlay.disabled_ids());
        let tags = PropertyValue::text_list(self.overlay.disabled_tags());

        self.properties.set(ITEMS_PROPERTY, items);
        self.properties.set(DISABLED_IDS_PROPERTY, ids);
        self.properties.set(DISABLED_TAGS_PROPERTY, tags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{PropertyConditions, PropertyHolder};
    use crate::inventory::ItemCatalog;
    use crate::overlay::OverlayDelta;
    use hoard_core::{DeterministicRandom, ReplayRandom};

    const CHEST: &str = r#"{
        "loot": {
            "type": "selection",
            "components": [
                {"type": "item", "item": "gold", "count": 5, "limit": 1, "componentId": "gold"},
                {"type": "item", "item": "sword", "limit": 1, "componentTags": ["weapon"]}
            ]
        },
        "disableByComponentTags": ["weapon"]
    }"#;

    fn chest() -> LootTableInstance {
        let asset = LootTableAsset::parse("chest", CHEST).unwrap();
        LootTableInstance::new(&asset, None)
    }

    #[test]
    fn test_publishes_properties() {
        let table = chest();
        assert_eq!(
            table.properties().lookup(ITEMS_PROPERTY),
            Some(&PropertyValue::text_list(["gold", "sword"]))
        );
        assert_eq!(
            table.properties().lookup(DISABLED_TAGS_PROPERTY),
            Some(&PropertyValue::text_list(["weapon"]))
        );
        assert_eq!(
            table.properties().lookup(DISABLED_IDS_PROPERTY),
            Some(&PropertyValue::List(Vec::new()))
        );
    }

    #[test]
    fn test_override_layer_updates_overlay_and_properties() {
        let mut table = chest();
        table.apply_layer(&TableLayer::overriding(OverlayDelta {
            disable_ids: vec!["gold".into()],
            enable_tags: vec!["weapon".into()],
            ..OverlayDelta::default()
        }));

        assert_eq!(
            table.properties().lookup("disableByComponentId.0"),
            Some(&PropertyValue::from("gold"))
        );

        let mut rng = ReplayRandom::from_draws(&[0.3]);
        let drops = table.evaluate(&PropertyConditions, &mut rng);
        assert_eq!(drops, vec![LootDrop::new("sword", 1)]);
    }

    #[test]
    fn test_disabled_tag_excludes_sword() {
        let table = chest();
        for seed in 0..50 {
            let mut rng = DeterministicRandom::new(seed);
            let drops = table.evaluate(&PropertyConditions, &mut rng);
            assert_eq!(drops, vec![LootDrop::new("gold", 5)]);
        }
    }

    #[test]
    fn test_table_without_loot_draws_nothing() {
        assert!(LootTableAsset::parse("empty", "{}").is_err());

        let mut table = chest();
        table.apply_layer(&TableLayer::base(None, OverlayDelta::default()));
        assert!(table.loot().is_none());
        assert_eq!(
            table.properties().lookup(ITEMS_PROPERTY),
            Some(&PropertyValue::List(Vec::new()))
        );

        let mut rng = DeterministicRandom::new(1);
        assert!(table.evaluate(&PropertyConditions, &mut rng).is_empty());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_parent_properties_reach_conditions() {
        let asset = LootTableAsset::parse(
            "altar",
            r#"{"loot": {"type": "item", "item": "relic", "conditions": ["moon == full"]}}"#,
        )
        .unwrap();
        let mut world = Properties::new();
        world.set("moon", "full");
        let table = LootTableInstance::new(&asset, Some(Arc::new(world)));

        let mut rng = DeterministicRandom::new(3);
        assert_eq!(
            table.evaluate(&PropertyConditions, &mut rng),
            vec![LootDrop::new("relic", 1)]
        );
    }

    #[test]
    fn test_fill_places_generated_loot() {
        let table = chest();
        let mut inventory = Inventory::new(4);
        let mut rng = DeterministicRandom::new(9);
        let leftovers = table.fill(
            &PropertyConditions,
            &mut inventory,
            true,
            &ItemCatalog::default(),
            &mut rng,
        );
        assert!(leftovers.is_empty());
        assert_eq!(inventory.count_item("gold"), 5);
        // gate, count, pick, gold count, then 3 shuffle swaps
        assert_eq!(rng.draws(), 7);
    }
}
