//! # Runtime Loot Instance
//!
//! A [`LootSchema`] bound to its owner. The schema is read-only; the only
//! mutable state is the per-pool remaining-limit scratch, created fresh for
//! each pool evaluation and dropped when it returns.
//!
//! ## Draw Order
//!
//! The draw sequence is part of the output. For every node:
//!
//! ```text
//! gate      1 draw   chance check (passes() is evaluated after the draw)
//! count     1 draw   how many times the body runs
//! body
//!   value            emit (preset, count)
//!   pool    per roll:
//!     collection     1 draw per available child (its gate), then its count + body
//!     selection      1 draw for the weighted pick, then the pick's count + body
//! ```
//!
//! A roll that finds no available child ends the pool without drawing.

use hoard_core::{RandomSource, WeightedRoll};
use tracing::debug;

use crate::condition::{ConditionEvaluator, PropertyHolder};
use crate::overlay::DisablementOverlay;
use crate::schema::{
    DrawLimit, DrawPolicy, LootDrop, LootSchema, NodeId, NodeKind, PoolChild, SchemaNode,
};

/// What an instance is bound to: the state that gates its nodes.
#[derive(Clone, Copy)]
pub struct LootOwner<'a> {
    /// Disabled ids and tags.
    pub overlay: &'a DisablementOverlay,
    /// Evaluates node conditions.
    pub evaluator: &'a dyn ConditionEvaluator,
    /// Properties conditions are evaluated against.
    pub properties: &'a dyn PropertyHolder,
}

/// A schema bound to an owner, ready to evaluate.
pub struct LootInstance<'a> {
    schema: &'a LootSchema,
    owner: LootOwner<'a>,
}

impl<'a> LootInstance<'a> {
    /// Binds a schema to its owner.
    #[must_use]
    pub fn bind(schema: &'a LootSchema, owner: LootOwner<'a>) -> Self {
        Self { schema, owner }
    }

    /// Runs one generation pass from the root.
    ///
    /// Never fails: exhausted pools simply stop contributing.
    pub fn evaluate<R>(&self, rng: &mut R) -> Vec<LootDrop>
    where
        R: RandomSource + ?Sized,
    {
        let mut drops = Vec::new();
        let root = self.schema.root();
        if self.gate(root, rng) {
            self.generate(root, rng, &mut drops);
        }
        drops
    }

    fn node(&self, id: NodeId) -> &'a SchemaNode {
        self.schema.node(id)
    }

    /// Overlay and conditions; no draw.
    fn passes(&self, id: NodeId) -> bool {
        let gate = &self.node(id).gate;
        self.owner
            .overlay
            .permits(gate.component_id.as_deref(), &gate.component_tags)
            && gate
                .conditions
                .iter()
                .all(|c| self.owner.evaluator.evaluate(c, self.owner.properties))
    }

    /// One chance draw, consumed whether or not the node passes.
    fn gate<R>(&self, id: NodeId, rng: &mut R) -> bool
    where
        R: RandomSource + ?Sized,
    {
        let draw = rng.next_double();
        self.passes(id) && draw * 100.0 < self.node(id).gate.chance
    }

    /// Count draw plus body. The caller has already gated the node.
    fn generate<R>(&self, id: NodeId, rng: &mut R, drops: &mut Vec<LootDrop>)
    where
        R: RandomSource + ?Sized,
    {
        let node = self.node(id);
        let count = node.gate.count.sample(rng);

        match &node.kind {
            NodeKind::Value { preset } => drops.push(LootDrop {
                preset: preset.clone(),
                count,
            }),
            NodeKind::Pool { policy, children } => {
                self.draw_pool(id, *policy, children, count, rng, drops);
            }
        }
    }

    fn draw_pool<R>(
        &self,
        id: NodeId,
        policy: DrawPolicy,
        children: &[PoolChild],
        rolls: u32,
        rng: &mut R,
        drops: &mut Vec<LootDrop>,
    ) where
        R: RandomSource + ?Sized,
    {
        let mut remaining: Vec<DrawLimit> = children.iter().map(|c| c.limit).collect();

        for roll in 0..rolls {
            let available: Vec<usize> = (0..children.len())
                .filter(|&i| remaining[i].is_available() && self.passes(children[i].node))
                .collect();

            if available.is_empty() {
                debug!(
                    node = id.index(),
                    policy = policy.name(),
                    roll,
                    rolls,
                    "pool exhausted"
                );
                return;
            }

            match policy {
                DrawPolicy::Collection => {
                    for i in available {
                        let child = children[i].node;
                        if rng.next_double() * 100.0 < self.node(child).gate.chance {
                            remaining[i].consume();
                            self.generate(child, rng, drops);
                        }
                    }
                }
                DrawPolicy::Selection => {
                    let candidates: WeightedRoll<usize> = available
                        .into_iter()
                        .map(|i| (i, self.node(children[i].node).gate.chance))
                        .collect();
                    if let Some(&i) = candidates.roll(rng) {
                        remaining[i].consume();
                        self.generate(children[i].node, rng, drops);
                    }
                }
            }
        }
    }
}
