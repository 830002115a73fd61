//! # Layered Configuration
//!
//! A loot table's effective state is the replay of an ordered list of layers
//! onto an empty state:
//!
//! ```text
//! base layer      ──► reset overlay, set loot tree, apply delta
//! override layer  ──► apply delta
//! override layer  ──► apply delta
//! ```
//!
//! Only a base layer may carry a loot tree.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::compile::{as_object, compile_value, present, string_list};
use crate::error::{LootError, LootResult, Location};
use crate::overlay::{DisablementOverlay, OverlayDelta};
use crate::schema::LootSchema;

/// JSON keys of the four delta lists, in application order.
const DISABLE_IDS: &str = "disableByComponentId";
const ENABLE_IDS: &str = "enableByComponentId";
const DISABLE_TAGS: &str = "disableByComponentTags";
const ENABLE_TAGS: &str = "enableByComponentTags";

/// One configuration layer.
#[derive(Clone, Debug, PartialEq)]
pub struct TableLayer {
    base: bool,
    loot: Option<Arc<LootSchema>>,
    delta: OverlayDelta,
}

impl TableLayer {
    /// A base layer: resets the overlay and replaces the loot tree.
    #[must_use]
    pub fn base(loot: Option<Arc<LootSchema>>, delta: OverlayDelta) -> Self {
        Self {
            base: true,
            loot,
            delta,
        }
    }

    /// An override layer: only changes the overlay.
    #[must_use]
    pub fn overriding(delta: OverlayDelta) -> Self {
        Self {
            base: false,
            loot: None,
            delta,
        }
    }

    /// Returns true for a base layer.
    #[inline]
    #[must_use]
    pub const fn is_base(&self) -> bool {
        self.base
    }

    /// The loot tree carried by a base layer.
    #[must_use]
    pub fn loot(&self) -> Option<&Arc<LootSchema>> {
        self.loot.as_ref()
    }

    /// The enable/disable changes of this layer.
    #[must_use]
    pub fn delta(&self) -> &OverlayDelta {
        &self.delta
    }

    /// Applies this layer on top of `loot` and `overlay`.
    pub fn apply(&self, loot: &mut Option<Arc<LootSchema>>, overlay: &mut DisablementOverlay) {
        debug!(
            base = self.base,
            disable_ids = self.delta.disable_ids.len(),
            enable_ids = self.delta.enable_ids.len(),
            disable_tags = self.delta.disable_tags.len(),
            enable_tags = self.delta.enable_tags.len(),
            "applying loot layer"
        );
        if self.base {
            overlay.reset_to_base();
            loot.clone_from(&self.loot);
        }
        overlay.apply_delta(&self.delta);
    }
}

/// The ordered layers of one loot table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerStack {
    layers: Vec<TableLayer>,
}

impl LayerStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer.
    pub fn push(&mut self, layer: TableLayer) {
        self.layers.push(layer);
    }

    /// Layers in application order.
    pub fn iter(&self) -> impl Iterator<Item = &TableLayer> {
        self.layers.iter()
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if there are no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Replays every layer onto an empty state.
    #[must_use]
    pub fn replay(&self) -> (Option<Arc<LootSchema>>, DisablementOverlay) {
        let mut loot = None;
        let mut overlay = DisablementOverlay::new();
        for layer in &self.layers {
            layer.apply(&mut loot, &mut overlay);
        }
        (loot, overlay)
    }

    /// Reads a loot-table asset document.
    ///
    /// The top-level object is the base layer (`loot` plus delta lists);
    /// the optional `layers` array holds override layers.
    ///
    /// # Errors
    ///
    /// Returns the first authoring error, including a base layer without
    /// `loot` and `loot` inside an override layer.
    pub fn from_document(asset: &str, document: &Value) -> LootResult<Self> {
        let root = Location::root(asset);
        let object = as_object(&root, document)?;

        let loot = present(object, "loot").ok_or_else(|| LootError::MissingField {
            at: root.clone(),
            field: "loot",
        })?;
        let loot = Arc::new(compile_value(&root.key("loot"), loot)?);

        let mut stack = Self::new();
        stack.push(TableLayer::base(Some(loot), delta(&root, object)?));

        if let Some(value) = present(object, "layers") {
            let layers_at = root.key("layers");
            let layers = value.as_array().ok_or_else(|| LootError::WrongType {
                at: layers_at.clone(),
                expected: "array",
            })?;
            for (i, layer) in layers.iter().enumerate() {
                let layer_at = layers_at.index(i);
                let layer_object = as_object(&layer_at, layer)?;
                if layer_object.contains_key("loot") {
                    return Err(LootError::UnexpectedField {
                        at: layer_at.key("loot"),
                        field: "loot".to_string(),
                    });
                }
                stack.push(TableLayer::overriding(delta(&layer_at, layer_object)?));
            }
        }

        Ok(stack)
    }
}

fn delta(at: &Location, object: &Map<String, Value>) -> LootResult<OverlayDelta> {
    let list = |key: &str| -> LootResult<Vec<String>> {
        present(object, key).map_or_else(|| Ok(Vec::new()), |v| string_list(&at.key(key), v))
    };
    Ok(OverlayDelta {
        disable_ids: list(DISABLE_IDS)?,
        enable_ids: list(ENABLE_IDS)?,
        disable_tags: list(DISABLE_TAGS)?,
        enable_tags: list(ENABLE_TAGS)?,
    })
}
