//! Simulator errors.

use std::path::PathBuf;

use hoard_loot::LootError;
use thiserror::Error;

use crate::cli::CliError;

/// Everything that can stop a simulator run.
#[derive(Error, Debug)]
pub enum SimError {
    /// Bad command line.
    #[error(transparent)]
    Cli(#[from] CliError),

    /// The table or config failed to load.
    #[error(transparent)]
    Loot(#[from] LootError),

    /// The table file could not be read.
    #[error("could not read {}: {source}", path.display())]
    Read {
        /// Table path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
