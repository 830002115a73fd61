//! # Loot Statistics
//!
//! Monte-Carlo runs over one table, for tuning authored weights and for
//! verifying that observed rates match the intended ones.

use std::collections::BTreeMap;

use hoard_core::DeterministicRandom;

use crate::condition::ConditionEvaluator;
use crate::schema::{ContentPreset, LootDrop};
use crate::table::LootTableInstance;

/// Aggregated results of repeated generation passes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LootStatistics {
    /// Generation passes performed.
    pub total_rolls: u64,
    /// Passes that produced at least one drop.
    pub rolls_with_drops: u64,
    /// Total quantity per preset.
    pub item_counts: BTreeMap<ContentPreset, u64>,
    /// Number of drop entries per preset.
    pub item_appearances: BTreeMap<ContentPreset, u64>,
    /// Random draws consumed by the whole run.
    pub total_draws: u64,
}

impl LootStatistics {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one pass.
    pub fn record(&mut self, drops: &[LootDrop]) {
        self.total_rolls += 1;
        if !drops.is_empty() {
            self.rolls_with_drops += 1;
        }
        for drop in drops {
            *self.item_counts.entry(drop.preset.clone()).or_insert(0) += u64::from(drop.count);
            *self.item_appearances.entry(drop.preset.clone()).or_insert(0) += 1;
        }
    }

    /// Percentage of passes that produced anything.
    #[must_use]
    pub fn drop_rate_percent(&self) -> f64 {
        if self.total_rolls == 0 {
            0.0
        } else {
            (self.rolls_with_drops as f64 / self.total_rolls as f64) * 100.0
        }
    }

    /// Fraction of all drop entries that were `preset`.
    #[must_use]
    pub fn share(&self, preset: &str) -> f64 {
        let total: u64 = self.item_appearances.values().sum();
        if total == 0 {
            return 0.0;
        }
        let hits = self
            .item_appearances
            .get(&ContentPreset::from(preset))
            .copied()
            .unwrap_or(0);
        hits as f64 / total as f64
    }
}

/// Evaluates `table` `iterations` times on one stream seeded with `seed`.
#[must_use]
pub fn run_statistics(
    table: &LootTableInstance,
    evaluator: &dyn ConditionEvaluator,
    seed: u64,
    iterations: u32,
) -> LootStatistics {
    let mut rng = DeterministicRandom::new(seed);
    let mut stats = LootStatistics::new();

    for _ in 0..iterations {
        let drops = table.evaluate(evaluator, &mut rng);
        stats.record(&drops);
    }

    stats.total_draws = rng.draws();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::LootTableAsset;
    use crate::condition::PropertyConditions;

    fn table(text: &str) -> LootTableInstance {
        LootTableInstance::new(&LootTableAsset::parse("t", text).unwrap(), None)
    }

    #[test]
    fn test_record() {
        let mut stats = LootStatistics::new();
        stats.record(&[LootDrop::new("gold", 5), LootDrop::new("gem", 1)]);
        stats.record(&[]);
        stats.record(&[LootDrop::new("gold", 2)]);

        assert_eq!(stats.total_rolls, 3);
        assert_eq!(stats.rolls_with_drops, 2);
        assert_eq!(stats.item_counts[&ContentPreset::from("gold")], 7);
        assert!((stats.share("gold") - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.share("sword"), 0.0);
    }

    #[test]
    fn test_chance_rate_converges() {
        let table = table(r#"{"loot": {"type": "item", "item": "coin", "chance": 25}}"#);
        let stats = run_statistics(&table, &PropertyConditions, 7, 20_000);
        let rate = stats.drop_rate_percent();
        assert!((23.0..27.0).contains(&rate), "rate {rate}");
    }

    #[test]
    fn test_same_seed_same_statistics() {
        let table = table(
            r#"{"loot": {"type": "selection", "count": {"min": 1, "max": 3}, "components": [
                {"type": "item", "item": "a", "chance": 60},
                {"type": "item", "item": "b", "chance": 40, "count": {"min": 1, "max": 4}}
            ]}}"#,
        );
        let first = run_statistics(&table, &PropertyConditions, 11, 2_000);
        let second = run_statistics(&table, &PropertyConditions, 11, 2_000);
        assert_eq!(first, second);
        assert!(first.total_draws > 0);
    }
}
