//! # HOARD
//!
//! Tools over the HOARD loot engine. The engine itself lives in
//! [`hoard_core`] (deterministic primitives) and [`hoard_loot`] (schemas,
//! instances, inventory fill).

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cli;
pub mod error;
pub mod report;

pub use cli::{CliError, SimOptions, USAGE};
pub use error::SimError;
