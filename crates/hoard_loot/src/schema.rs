//! # Loot Schema
//!
//! The compiled, immutable decision tree. Compiled once at content load and
//! shared (read-only) by every runtime instance.
//!
//! ## Layout
//!
//! Nodes live in a flat arena. Node 0 is the root and every child id is
//! strictly greater than its parent's id, so a cycle cannot be expressed:
//!
//! ```text
//! [0] selection ──► [1] item "gold"
//!               └─► [2] collection ──► [3] item "gem"
//!                                  └─► [4] item "coin"
//! ```

use std::collections::BTreeSet;
use std::fmt;

use hoard_core::Range;

use crate::condition::Condition;
use crate::error::{LootError, LootResult};

/// Index of a node in its schema's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node of every schema.
    pub const ROOT: Self = Self(0);

    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Arena index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque reference to a producible item.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentPreset(String);

impl ContentPreset {
    /// Wraps a preset identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The preset identifier.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentPreset {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// How a pool draws from its children on each roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawPolicy {
    /// Every available child gets its own chance check; several may fire.
    Collection,
    /// Exactly one available child is picked, weighted by chance.
    Selection,
}

impl DrawPolicy {
    /// Authored name of the policy.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Selection => "selection",
        }
    }
}

/// How many times a pool child may be drawn within one pool evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DrawLimit {
    /// No limit (authored as `-1`).
    #[default]
    Unlimited,
    /// At most this many draws.
    Limited(u32),
}

impl DrawLimit {
    /// Maps an authored limit: `-1` is unlimited, `n >= 1` is a limit.
    #[must_use]
    pub fn from_authored(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Self::Unlimited),
            n if n >= 1 => u32::try_from(n).ok().map(Self::Limited),
            _ => None,
        }
    }

    /// Returns true while at least one draw remains.
    #[inline]
    #[must_use]
    pub const fn is_available(self) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(n) => n > 0,
        }
    }

    /// Uses up one draw.
    #[inline]
    pub fn consume(&mut self) {
        if let Self::Limited(n) = self {
            *n = n.saturating_sub(1);
        }
    }
}

/// Gating shared by every node kind.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeGate {
    /// Predicates that must all hold.
    pub conditions: Vec<Condition>,
    /// Percentage in `(0, 100]`; a weight under selection.
    pub chance: f64,
    /// How many times the node's body runs per evaluation.
    pub count: Range,
    /// Identity for targeted disablement.
    pub component_id: Option<String>,
    /// Labels for group disablement.
    pub component_tags: BTreeSet<String>,
}

impl Default for NodeGate {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            chance: 100.0,
            count: Range::default(),
            component_id: None,
            component_tags: BTreeSet::new(),
        }
    }
}

/// A pool entry: the child node plus its per-evaluation draw limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolChild {
    /// Child node.
    pub node: NodeId,
    /// Draw limit within one evaluation of the parent pool.
    pub limit: DrawLimit,
}

/// What a node produces.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Leaf: emits one preset.
    Value {
        /// The preset emitted.
        preset: ContentPreset,
    },
    /// Compound: draws from children.
    Pool {
        /// Draw policy.
        policy: DrawPolicy,
        /// Children in authored order.
        children: Vec<PoolChild>,
    },
}

/// One node of the tree.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaNode {
    /// Gating fields.
    pub gate: NodeGate,
    /// Leaf or pool body.
    pub kind: NodeKind,
}

/// An immutable, acyclic loot tree.
#[derive(Clone, Debug, PartialEq)]
pub struct LootSchema {
    nodes: Vec<SchemaNode>,
}

impl LootSchema {
    /// Builds a schema from an arena, checking the parent-before-child order.
    ///
    /// # Errors
    ///
    /// Returns [`LootError::MalformedTree`] if the arena is empty, a child id
    /// is out of bounds, or a child does not come after its parent.
    pub fn from_nodes(asset: &str, nodes: Vec<SchemaNode>) -> LootResult<Self> {
        let malformed = |reason: String| LootError::MalformedTree {
            asset: asset.to_string(),
            reason,
        };

        if nodes.is_empty() {
            return Err(malformed("no root node".to_string()));
        }
        if u32::try_from(nodes.len()).is_err() {
            return Err(malformed(format!("{} nodes exceed the arena size", nodes.len())));
        }

        for (parent, node) in nodes.iter().enumerate() {
            if let NodeKind::Pool { children, .. } = &node.kind {
                for child in children {
                    let index = child.node.index();
                    if index <= parent || index >= nodes.len() {
                        return Err(malformed(format!(
                            "node {parent} has child {index} out of order"
                        )));
                    }
                }
            }
        }

        Ok(Self { nodes })
    }

    /// The root node id.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// A node by id.
    ///
    /// Ids are only handed out by the schema they index.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.index()]
    }

    /// Number of nodes in the tree.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a schema has at least a root.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every preset the tree can emit, deduplicated, in first-authored order.
    #[must_use]
    pub fn referenced_presets(&self) -> Vec<&ContentPreset> {
        let mut seen = BTreeSet::new();
        self.nodes
            .iter()
            .filter_map(|node| match &node.kind {
                NodeKind::Value { preset } => Some(preset),
                NodeKind::Pool { .. } => None,
            })
            .filter(|preset| seen.insert(*preset))
            .collect()
    }

    /// Every `componentId` declared in the tree.
    pub fn component_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter_map(|node| node.gate.component_id.as_deref())
    }
}

/// One generated entry: a preset and how many of it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LootDrop {
    /// Item preset.
    pub preset: ContentPreset,
    /// Quantity; zero when the authored count range allows it.
    pub count: u32,
}

impl LootDrop {
    /// Creates a drop.
    #[must_use]
    pub fn new(preset: impl Into<String>, count: u32) -> Self {
        Self {
            preset: ContentPreset::new(preset),
            count,
        }
    }
}

impl fmt::Display for LootDrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.preset, self.count)
    }
}

/// CRC32 over a drop list, order-sensitive.
///
/// Peers exchange this after a generation pass; a mismatch means their
/// streams or overlays diverged.
#[must_use]
pub fn drops_checksum(drops: &[LootDrop]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for drop in drops {
        hasher.update(drop.preset.as_str().as_bytes());
        hasher.update(&[0]);
        hasher.update(&drop.count.to_le_bytes());
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(preset: &str) -> SchemaNode {
        SchemaNode {
            gate: NodeGate::default(),
            kind: NodeKind::Value {
                preset: ContentPreset::from(preset),
            },
        }
    }

    fn pool(children: &[u32]) -> SchemaNode {
        SchemaNode {
            gate: NodeGate::default(),
            kind: NodeKind::Pool {
                policy: DrawPolicy::Selection,
                children: children
                    .iter()
                    .map(|&i| PoolChild {
                        node: NodeId::new(i),
                        limit: DrawLimit::Unlimited,
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn test_limit_from_authored() {
        assert_eq!(DrawLimit::from_authored(-1), Some(DrawLimit::Unlimited));
        assert_eq!(DrawLimit::from_authored(1), Some(DrawLimit::Limited(1)));
        assert_eq!(DrawLimit::from_authored(0), None);
        assert_eq!(DrawLimit::from_authored(-2), None);
        assert_eq!(DrawLimit::from_authored(i64::MAX), None);
    }

    #[test]
    fn test_limit_consume() {
        let mut limit = DrawLimit::Limited(2);
        limit.consume();
        assert!(limit.is_available());
        limit.consume();
        assert!(!limit.is_available());
        limit.consume();
        assert_eq!(limit, DrawLimit::Limited(0));

        let mut unlimited = DrawLimit::Unlimited;
        unlimited.consume();
        assert!(unlimited.is_available());
    }

    #[test]
    fn test_arena_order_enforced() {
        let ok = LootSchema::from_nodes("t", vec![pool(&[1, 2]), leaf("a"), leaf("b")]);
        assert!(ok.is_ok());

        // A child pointing back at its parent is a cycle.
        let cycle = LootSchema::from_nodes("t", vec![pool(&[0])]);
        assert!(matches!(cycle, Err(LootError::MalformedTree { .. })));

        let dangling = LootSchema::from_nodes("t", vec![pool(&[5])]);
        assert!(matches!(dangling, Err(LootError::MalformedTree { .. })));

        let empty = LootSchema::from_nodes("t", Vec::new());
        assert!(matches!(empty, Err(LootError::MalformedTree { .. })));
    }

    #[test]
    fn test_referenced_presets_dedup() {
        let schema =
            LootSchema::from_nodes("t", vec![pool(&[1, 2, 3]), leaf("gold"), leaf("gem"), leaf("gold")])
                .unwrap();
        let presets: Vec<&str> = schema
            .referenced_presets()
            .into_iter()
            .map(ContentPreset::as_str)
            .collect();
        assert_eq!(presets, vec!["gold", "gem"]);
    }

    #[test]
    fn test_checksum_order_sensitive() {
        let a = vec![LootDrop::new("gold", 5), LootDrop::new("sword", 1)];
        let b = vec![LootDrop::new("sword", 1), LootDrop::new("gold", 5)];
        assert_eq!(drops_checksum(&a), drops_checksum(&a.clone()));
        assert_ne!(drops_checksum(&a), drops_checksum(&b));
        assert_ne!(
            drops_checksum(&[LootDrop::new("gold", 5)]),
            drops_checksum(&[LootDrop::new("gold", 6)])
        );
    }
}
