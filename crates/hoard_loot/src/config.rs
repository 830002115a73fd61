//! # Generator Configuration
//!
//! Runtime settings loaded once at startup from a TOML file:
//!
//! ```toml
//! seed = 42
//! shuffle = true
//! grid_slots = 27
//! default_max_stack = 64
//! slot_categories = [["currency"], ["weapon", "armor"]]
//!
//! [items.gold]
//! category = "currency"
//! max_stack = 99
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{LootError, LootResult};
use crate::inventory::{Inventory, ItemCatalog, ItemDef, Slot, DEFAULT_MAX_STACK};

const fn default_grid_slots() -> usize {
    27
}

const fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

/// Settings for a generation run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// World seed; per-table streams are derived from it.
    #[serde(default)]
    pub seed: u64,
    /// Shuffle slot order before filling.
    #[serde(default)]
    pub shuffle: bool,
    /// Number of inventory slots.
    #[serde(default = "default_grid_slots")]
    pub grid_slots: usize,
    /// Stack size for items without explicit rules.
    #[serde(default = "default_max_stack")]
    pub default_max_stack: u32,
    /// Accept lists for the first slots; missing or empty lists accept anything.
    #[serde(default)]
    pub slot_categories: Vec<Vec<String>>,
    /// Per-item rules.
    #[serde(default)]
    pub items: BTreeMap<String, ItemDef>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            shuffle: false,
            grid_slots: default_grid_slots(),
            default_max_stack: default_max_stack(),
            slot_categories: Vec::new(),
            items: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`LootError::InvalidConfig`] on a parse error or an invalid value.
    pub fn from_toml_str(text: &str) -> LootResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| LootError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LootError::Io`] if the file cannot be read, otherwise as
    /// [`GeneratorConfig::from_toml_str`].
    pub fn load(path: &Path) -> LootResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| LootError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> LootResult<()> {
        if self.default_max_stack == 0 {
            return Err(LootError::InvalidConfig(
                "default_max_stack must be at least 1".to_string(),
            ));
        }
        if self.slot_categories.len() > self.grid_slots {
            return Err(LootError::InvalidConfig(format!(
                "{} slot_categories entries for {} grid_slots",
                self.slot_categories.len(),
                self.grid_slots
            )));
        }
        if let Some((name, _)) = self.items.iter().find(|(_, def)| def.max_stack == Some(0)) {
            return Err(LootError::InvalidConfig(format!(
                "items.{name}.max_stack must be at least 1"
            )));
        }
        Ok(())
    }

    /// Item rules described by this config.
    #[must_use]
    pub fn catalog(&self) -> ItemCatalog {
        let mut catalog = ItemCatalog::new(self.default_max_stack);
        for (name, def) in &self.items {
            catalog.insert(name.clone(), def.clone());
        }
        catalog
    }

    /// An empty inventory laid out as configured.
    #[must_use]
    pub fn inventory(&self) -> Inventory {
        let slots = (0..self.grid_slots)
            .map(|i| {
                self.slot_categories
                    .get(i)
                    .map_or_else(Slot::new, |categories| Slot::accepting(categories.iter().cloned()))
            })
            .collect();
        Inventory::with_slots(slots)
    }
}
