//! # HOARD Loot
//!
//! Deterministic loot generation from authored, weighted, conditionally
//! filtered decision trees.
//!
//! ## Pipeline
//!
//! ```text
//! JSON asset ──► LootCatalogue ──► LootTableAsset (layers)
//!                                        │
//!                 owner instantiated ──► LootTableInstance (tree + overlay)
//!                                        │ evaluate(rng)
//!                                        ▼
//!                              [(preset, count), ...] ──► Inventory::fill
//! ```
//!
//! ## Determinism Contract
//!
//! Every peer that evaluates the same tree with the same overlay on the same
//! stream produces the same list, draw for draw. Generation never fails at
//! runtime; authoring mistakes are rejected when the asset loads.
//!
//! ## Example
//!
//! ```rust
//! use hoard_core::DeterministicRandom;
//! use hoard_loot::{LootTableAsset, LootTableInstance, PropertyConditions};
//!
//! let asset = LootTableAsset::parse("chest", r#"{
//!     "loot": {"type": "selection", "components": [
//!         {"type": "item", "item": "gold", "count": 5, "limit": 1},
//!         {"type": "item", "item": "sword", "limit": 1}
//!     ]}
//! }"#).unwrap();
//!
//! let table = LootTableInstance::new(&asset, None);
//! let mut rng = DeterministicRandom::derive(42, "chest");
//! let drops = table.evaluate(&PropertyConditions, &mut rng);
//! assert_eq!(drops.len(), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod catalogue;
pub mod compile;
pub mod condition;
pub mod config;
pub mod error;
pub mod instance;
pub mod inventory;
pub mod layers;
pub mod overlay;
pub mod schema;
pub mod stats;
pub mod strict;
pub mod table;

pub use catalogue::{LootCatalogue, LootTableAsset};
pub use compile::{compile_str, compile_value};
pub use condition::{
    Condition, ConditionEvaluator, Properties, PropertyConditions, PropertyHolder, PropertyValue,
};
pub use config::GeneratorConfig;
pub use error::{Location, LootError, LootResult};
pub use instance::{LootInstance, LootOwner};
pub use inventory::{Inventory, ItemCatalog, ItemDef, ItemRules, ItemStack, Slot};
pub use layers::{LayerStack, TableLayer};
pub use overlay::{DisablementOverlay, OverlayDelta};
pub use schema::{
    drops_checksum, ContentPreset, DrawLimit, DrawPolicy, LootDrop, LootSchema, NodeGate, NodeId,
    NodeKind, PoolChild, SchemaNode,
};
pub use stats::{run_statistics, LootStatistics};
pub use strict::parse_document;
pub use table::LootTableInstance;
