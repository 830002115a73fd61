//! # Weighted Roll
//!
//! Single-draw proportional selection over entries in insertion order.
//!
//! ```text
//! weights:     75        25
//! cumulative: [75,      100]
//! r = 0.8  →  r * S = 80  →  first cumulative > 80  →  index 1
//! ```

use crate::random::RandomSource;

/// A set of entries with positive weights.
#[derive(Clone, Debug)]
pub struct WeightedRoll<T> {
    entries: Vec<T>,
    cumulative: Vec<f64>,
    total: f64,
}

impl<T> WeightedRoll<T> {
    /// Creates an empty roll.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            cumulative: Vec::new(),
            total: 0.0,
        }
    }

    /// Creates an empty roll with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            cumulative: Vec::with_capacity(capacity),
            total: 0.0,
        }
    }

    /// Appends an entry.
    ///
    /// Entries with a non-positive or non-finite weight can never be picked
    /// and are not added.
    pub fn push(&mut self, entry: T, weight: f64) {
        if !(weight.is_finite() && weight > 0.0) {
            return;
        }
        self.total += weight;
        self.entries.push(entry);
        self.cumulative.push(self.total);
    }

    /// Number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there is nothing to pick.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all weights.
    #[inline]
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.total
    }

    /// Index selected by a draw in `[0, 1)`, or `None` if empty.
    ///
    /// The smallest index whose cumulative weight exceeds `draw * total`.
    #[must_use]
    pub fn index_for(&self, draw: f64) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let target = draw.clamp(0.0, 1.0) * self.total;
        let index = self.cumulative.partition_point(|&c| c <= target);
        Some(index.min(self.entries.len() - 1))
    }

    /// Entry selected by a draw in `[0, 1)`, or `None` if empty.
    #[must_use]
    pub fn get(&self, draw: f64) -> Option<&T> {
        self.index_for(draw).map(|i| &self.entries[i])
    }

    /// Picks one entry, consuming exactly one draw.
    ///
    /// An empty roll returns `None` and consumes nothing, so callers can skip
    /// exhausted pools without breaking draw parity.
    pub fn roll<R>(&self, rng: &mut R) -> Option<&T>
    where
        R: RandomSource + ?Sized,
    {
        if self.is_empty() {
            return None;
        }
        self.get(rng.next_double())
    }

    /// Iterates entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

impl<T> Default for WeightedRoll<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(T, f64)> for WeightedRoll<T> {
    fn from_iter<I: IntoIterator<Item = (T, f64)>>(iter: I) -> Self {
        let mut roll = Self::new();
        for (entry, weight) in iter {
            roll.push(entry, weight);
        }
        roll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{DeterministicRandom, ReplayRandom};

    #[test]
    fn test_cumulative_order_selection() {
        let roll: WeightedRoll<&str> = [("gold", 50.0), ("sword", 50.0)].into_iter().collect();
        assert_eq!(roll.get(0.3), Some(&"gold"));
        assert_eq!(roll.get(0.49), Some(&"gold"));
        // Exactly on the boundary: cumulative must *exceed* r * S.
        assert_eq!(roll.get(0.5), Some(&"sword"));
        assert_eq!(roll.get(0.99), Some(&"sword"));
    }

    #[test]
    fn test_empty_roll_consumes_nothing() {
        let roll: WeightedRoll<u32> = WeightedRoll::new();
        let mut rng = ReplayRandom::from_draws(&[0.5]);
        assert!(roll.roll(&mut rng).is_none());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_non_positive_weights_skipped() {
        let mut roll = WeightedRoll::with_capacity(3);
        roll.push('a', 0.0);
        roll.push('b', -3.0);
        roll.push('c', f64::NAN);
        assert!(roll.is_empty());

        roll.push('d', 2.0);
        assert_eq!(roll.len(), 1);
        assert_eq!(roll.get(0.999), Some(&'d'));
    }

    #[test]
    fn test_ratio_converges() {
        let roll: WeightedRoll<usize> = [(0, 75.0), (1, 25.0)].into_iter().collect();
        let mut rng = DeterministicRandom::new(2024);
        let mut counts = [0u32; 2];

        for _ in 0..40_000 {
            counts[*roll.roll(&mut rng).unwrap()] += 1;
        }

        let ratio = f64::from(counts[0]) / f64::from(counts[1]);
        assert!((2.8..3.2).contains(&ratio), "ratio {ratio}");
        assert_eq!(rng.draws(), 40_000);
    }
}
