//! # Loot Catalogue
//!
//! Loads every loot-table asset at content-load time. A broken asset is
//! reported once and left out; its siblings load normally.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::condition::Properties;
use crate::error::{LootError, LootResult};
use crate::layers::LayerStack;
use crate::schema::{ContentPreset, LootSchema};
use crate::strict::parse_document;
use crate::table::LootTableInstance;

/// File extension of authored loot tables.
pub const ASSET_EXTENSION: &str = "json";

/// One compiled loot-table asset.
#[derive(Clone, Debug, PartialEq)]
pub struct LootTableAsset {
    name: String,
    layers: LayerStack,
}

impl LootTableAsset {
    /// Parses and compiles an asset document.
    ///
    /// # Errors
    ///
    /// Returns the first syntax or authoring error, located by asset name and
    /// JSON path.
    pub fn parse(name: &str, text: &str) -> LootResult<Self> {
        let document = parse_document(name, text)?;
        Self::from_value(name, &document)
    }

    /// Compiles an already-parsed asset document.
    ///
    /// # Errors
    ///
    /// Returns the first authoring error.
    pub fn from_value(name: &str, document: &Value) -> LootResult<Self> {
        Ok(Self {
            name: name.to_string(),
            layers: LayerStack::from_document(name, document)?,
        })
    }

    /// Asset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration layers, base first.
    #[must_use]
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// The loot tree after replaying every layer.
    #[must_use]
    pub fn loot(&self) -> Option<Arc<LootSchema>> {
        self.layers.replay().0
    }

    /// Presets the asset can emit, for dependency resolution.
    #[must_use]
    pub fn referenced_presets(&self) -> Vec<ContentPreset> {
        self.loot()
            .map(|schema| schema.referenced_presets().into_iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Successfully compiled assets, by name.
#[derive(Clone, Debug, Default)]
pub struct LootCatalogue {
    tables: BTreeMap<String, LootTableAsset>,
    failures: Vec<LootError>,
}

impl LootCatalogue {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `(name, text)` pairs. Failures are logged and recorded.
    pub fn from_sources<I, N, T>(sources: I) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let mut catalogue = Self::new();
        for (name, text) in sources {
            catalogue.load(name.as_ref(), text.as_ref());
        }
        info!(
            loaded = catalogue.tables.len(),
            failed = catalogue.failures.len(),
            "loot catalogue loaded"
        );
        catalogue
    }

    /// Loads every `*.json` file in `dir`, named by file stem.
    ///
    /// # Errors
    ///
    /// Returns [`LootError::Io`] if the directory itself cannot be listed.
    /// Unreadable or invalid files are recorded as failures instead.
    pub fn from_dir(dir: &Path) -> LootResult<Self> {
        let io_error = |path: &Path, e: &std::io::Error| LootError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| io_error(dir, &e))? {
            let path = entry.map_err(|e| io_error(dir, &e))?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ASSET_EXTENSION) {
                paths.push(path);
            }
        }
        // Directory order is platform-dependent.
        paths.sort();

        let mut catalogue = Self::new();
        for path in paths {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            match fs::read_to_string(&path) {
                Ok(text) => {
                    catalogue.load(&name, &text);
                }
                Err(e) => {
                    catalogue.tables.remove(&name);
                    catalogue.reject(io_error(&path, &e));
                }
            }
        }
        info!(
            dir = %dir.display(),
            loaded = catalogue.tables.len(),
            failed = catalogue.failures.len(),
            "loot catalogue loaded"
        );
        Ok(catalogue)
    }

    /// Compiles one asset, replacing any previous asset or failure of the
    /// same name.
    ///
    /// Returns true on success. A failure is logged and recorded, and the
    /// name no longer resolves.
    pub fn load(&mut self, name: &str, text: &str) -> bool {
        self.failures.retain(|failure| failure.asset() != Some(name));
        match LootTableAsset::parse(name, text) {
            Ok(asset) => {
                self.tables.insert(name.to_string(), asset);
                true
            }
            Err(error) => {
                self.tables.remove(name);
                self.reject(error);
                false
            }
        }
    }

    fn reject(&mut self, error: LootError) {
        warn!(%error, "loot table excluded");
        self.failures.push(error);
    }

    /// An asset by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LootTableAsset> {
        self.tables.get(name)
    }

    /// Instantiates an asset for an owner.
    #[must_use]
    pub fn instantiate(
        &self,
        name: &str,
        parent: Option<Arc<Properties>>,
    ) -> Option<LootTableInstance> {
        self.get(name)
            .map(|asset| LootTableInstance::new(asset, parent))
    }

    /// Asset names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of loaded assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if nothing loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Errors of the assets that were left out.
    #[must_use]
    pub fn failures(&self) -> &[LootError] {
        &self.failures
    }
}
