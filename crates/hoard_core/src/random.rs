//! # Deterministic Random
//!
//! **One shared, seeded draw stream per simulation instance.**
//!
//! Every peer of a distributed simulation must reproduce the same loot from
//! the same seed. That only holds if every component consumes *exactly one*
//! draw per logical decision and nobody caches or skips draws:
//!
//! ```text
//! seed ──► ChaCha20 ──► next_raw() ──► to_double() ──► [0, 1)
//!                         │
//!                         └── one call per chance check / range sample /
//!                             weighted pick / shuffle swap
//! ```
//!
//! The stream is passed explicitly (`&mut R where R: RandomSource`) through
//! every call site. There is no global generator.

use std::hash::Hasher;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use siphasher::sip::SipHasher13;

/// Number of mantissa bits used when converting a raw draw to a double.
const MANTISSA_BITS: u32 = 53;

/// Mask selecting the low 53 bits of a raw draw.
const MANTISSA_MASK: u64 = (1 << MANTISSA_BITS) - 1;

/// Second SipHash key used for stream derivation. Changing it changes every
/// derived stream, so it is frozen.
const STREAM_SALT: u64 = 0x484F_4152_445F_5354;

/// Converts a raw draw into a uniform double in `[0, 1)`.
///
/// Pure function of its input: only the low 53 bits are used.
#[inline]
#[must_use]
pub fn to_double(raw: u64) -> f64 {
    (raw & MANTISSA_MASK) as f64 / (1u64 << MANTISSA_BITS) as f64
}

/// A source of raw draws.
///
/// Implementations must advance their state by exactly one step per
/// [`RandomSource::next_raw`] call.
pub trait RandomSource {
    /// Advances the stream by one step and returns the raw value.
    fn next_raw(&mut self) -> u64;

    /// Advances the stream by one step and returns a double in `[0, 1)`.
    #[inline]
    fn next_double(&mut self) -> f64 {
        to_double(self.next_raw())
    }
}

/// Shuffles `items` in place (Fisher–Yates, from the back).
///
/// Consumes exactly `items.len() - 1` draws for a non-empty slice and none for
/// an empty or single-element slice.
pub fn shuffle<R, T>(rng: &mut R, items: &mut [T])
where
    R: RandomSource + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = (rng.next_double() * (i + 1) as f64) as usize;
        items.swap(i, j.min(i));
    }
}

/// Derives an independent stream seed from a world seed and a stable key.
///
/// Uses SipHash-1-3 so the result is identical across platforms and compiler
/// versions (unlike `std`'s `DefaultHasher`).
#[must_use]
pub fn derive_seed(world_seed: u64, stream_key: &str) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(world_seed, STREAM_SALT);
    hasher.write(stream_key.as_bytes());
    hasher.finish()
}

/// Position of a [`DeterministicRandom`] stream, for resynchronisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomSnapshot {
    /// Seed the stream was created from.
    pub seed: u64,
    /// ChaCha word position at the time of the snapshot.
    pub word_pos: u128,
    /// Number of draws consumed so far.
    pub draws: u64,
}

/// The seeded, call-order-sensitive random stream.
#[derive(Clone, Debug)]
pub struct DeterministicRandom {
    rng: ChaCha20Rng,
    seed: u64,
    draws: u64,
}

impl DeterministicRandom {
    /// Creates a stream from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            draws: 0,
        }
    }

    /// Creates the sub-stream identified by `stream_key` under `world_seed`.
    #[must_use]
    pub fn derive(world_seed: u64, stream_key: &str) -> Self {
        Self::new(derive_seed(world_seed, stream_key))
    }

    /// Rebuilds a stream at the exact position captured by a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: RandomSnapshot) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(snapshot.seed);
        rng.set_word_pos(snapshot.word_pos);
        Self {
            rng,
            seed: snapshot.seed,
            draws: snapshot.draws,
        }
    }

    /// Seed this stream was created from.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of draws consumed so far.
    #[inline]
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    /// Captures the current stream position.
    #[must_use]
    pub fn snapshot(&self) -> RandomSnapshot {
        RandomSnapshot {
            seed: self.seed,
            word_pos: self.rng.get_word_pos(),
            draws: self.draws,
        }
    }

    /// Picks one element of `items` with a single draw.
    ///
    /// Returns `None` without drawing when `items` is empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = (self.next_double() * items.len() as f64) as usize;
        items.get(index.min(items.len() - 1))
    }
}

impl RandomSource for DeterministicRandom {
    #[inline]
    fn next_raw(&mut self) -> u64 {
        self.draws += 1;
        self.rng.next_u64()
    }
}

/// Replays a recorded list of raw draws, cycling when exhausted.
///
/// Used to reproduce a peer's exact stream when triaging a desync, and to
/// drive generation with hand-picked draws in tests.
#[derive(Clone, Debug, Default)]
pub struct ReplayRandom {
    raws: Vec<u64>,
    cursor: usize,
    draws: u64,
}

impl ReplayRandom {
    /// Replays raw values as recorded.
    #[must_use]
    pub fn from_raw(raws: Vec<u64>) -> Self {
        Self {
            raws,
            cursor: 0,
            draws: 0,
        }
    }

    /// Replays doubles in `[0, 1)`; each converts back to (almost) itself
    /// through [`to_double`].
    #[must_use]
    pub fn from_draws(draws: &[f64]) -> Self {
        let scale = (1u64 << MANTISSA_BITS) as f64;
        let raws = draws
            .iter()
            .map(|d| (d.clamp(0.0, 1.0) * scale).min(MANTISSA_MASK as f64) as u64)
            .collect();
        Self::from_raw(raws)
    }

    /// Number of draws consumed so far.
    #[inline]
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomSource for ReplayRandom {
    fn next_raw(&mut self) -> u64 {
        self.draws += 1;
        if self.raws.is_empty() {
            return 0;
        }
        let raw = self.raws[self.cursor];
        self.cursor = (self.cursor + 1) % self.raws.len();
        raw
    }
}
