//! # HOARD Core
//!
//! Deterministic primitives shared by every HOARD generator:
//! - [`DeterministicRandom`]: a seeded stream where every draw advances state once
//! - [`Range`]: one draw → an integer in an inclusive bound
//! - [`WeightedRoll`]: one draw → one entry, proportional to weight
//!
//! ## Determinism Rules
//!
//! 1. **One draw per decision** - chance checks, range samples, weighted picks
//! 2. **No skipped draws** - early exits consume what the full path would have
//!    consumed up to that point, on every peer
//! 3. **Explicit streams** - the generator is always passed in, never global
//!
//! ## Example
//!
//! ```rust
//! use hoard_core::{DeterministicRandom, Range, WeightedRoll};
//!
//! let mut rng = DeterministicRandom::new(42);
//! let count = Range::new(1, 3).unwrap().sample(&mut rng);
//! assert!((1..=3).contains(&count));
//!
//! let roll: WeightedRoll<&str> = [("weapon", 3.0), ("armor", 1.0)].into_iter().collect();
//! assert!(roll.roll(&mut rng).is_some());
//! assert_eq!(rng.draws(), 2);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod random;
pub mod range;
pub mod weighted;

pub use random::{
    derive_seed, shuffle, to_double, DeterministicRandom, RandomSnapshot, RandomSource,
    ReplayRandom,
};
pub use range::Range;
pub use weighted::WeightedRoll;
