//! # Range
//!
//! Inclusive integer sampler. One draw in, one integer out.

use std::fmt;

use crate::random::RandomSource;

/// An inclusive `[min, max]` integer range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    min: u32,
    max: u32,
}

impl Range {
    /// Creates a range, or `None` when `min > max`.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Option<Self> {
        if min > max {
            None
        } else {
            Some(Self { min, max })
        }
    }

    /// Creates a zero-width range.
    #[must_use]
    pub const fn fixed(value: u32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Lower bound.
    #[inline]
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Upper bound.
    #[inline]
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Returns true when `min == max`.
    #[inline]
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Maps a draw in `[0, 1)` onto the range.
    ///
    /// `floor(min + draw * (max - min + 1))`, clamped to `max`.
    #[must_use]
    pub fn get(&self, draw: f64) -> u32 {
        if self.is_fixed() {
            return self.min;
        }
        let span = f64::from(self.max - self.min) + 1.0;
        let offset = (draw.max(0.0) * span).floor() as u64;
        let value = u64::from(self.min) + offset;
        value.min(u64::from(self.max)) as u32
    }

    /// Samples the range, consuming exactly one draw.
    ///
    /// Zero-width ranges still draw so that call order matches variable
    /// ranges on every peer.
    pub fn sample<R>(&self, rng: &mut R) -> u32
    where
        R: RandomSource + ?Sized,
    {
        let draw = rng.next_double();
        self.get(draw)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::fixed(1)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fixed() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}..={}", self.min, self.max)
        }
    }
}
