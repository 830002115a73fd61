//! # Simulator Arguments
//!
//! `loot_sim <table.json> [--config <file.toml>] [--seed <n>] [--runs <n>] [--fill]`

use std::path::PathBuf;

use thiserror::Error;

/// Errors in the simulator command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// No table path was given.
    #[error("missing loot table path")]
    MissingTable,

    /// A flag that takes a value was last.
    #[error("{0} needs a value")]
    MissingValue(&'static str),

    /// A numeric flag got something else.
    #[error("{flag} expects a number, got `{value}`")]
    InvalidNumber {
        /// The flag.
        flag: &'static str,
        /// What was passed.
        value: String,
    },

    /// An unrecognized flag.
    #[error("unknown option `{0}`")]
    UnknownFlag(String),
}

/// Parsed simulator options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimOptions {
    /// Loot table asset to load.
    pub table: PathBuf,
    /// Optional TOML generator config.
    pub config: Option<PathBuf>,
    /// Seed override; the config seed otherwise.
    pub seed: Option<u64>,
    /// Generation passes; above 1 prints statistics instead of drops.
    pub runs: u32,
    /// Place a single pass into a configured inventory.
    pub fill: bool,
}

/// Usage text.
pub const USAGE: &str = "\
Usage: loot_sim <table.json> [options]

Options:
  --config <file.toml>  Generator config (seed, slots, item rules)
  --seed <n>            Override the world seed
  --runs <n>            Evaluate n times and print statistics
  --fill                Place the drops into the configured inventory";

impl SimOptions {
    /// Parses arguments, excluding the program name.
    ///
    /// # Errors
    ///
    /// Returns a [`CliError`] describing the first problem.
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut table = None;
        let mut options = Self {
            table: PathBuf::new(),
            config: None,
            seed: None,
            runs: 1,
            fill: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let value = args.next().ok_or(CliError::MissingValue("--config"))?;
                    options.config = Some(PathBuf::from(value));
                }
                "--seed" => options.seed = Some(number(&mut args, "--seed")?),
                "--runs" => options.runs = number(&mut args, "--runs")?,
                "--fill" => options.fill = true,
                flag if flag.starts_with("--") => return Err(CliError::UnknownFlag(flag.to_string())),
                path => table = Some(PathBuf::from(path)),
            }
        }

        options.table = table.ok_or(CliError::MissingTable)?;
        Ok(options)
    }
}

fn number<T, I>(args: &mut I, flag: &'static str) -> Result<T, CliError>
where
    T: std::str::FromStr,
    I: Iterator<Item = String>,
{
    let value = args.next().ok_or(CliError::MissingValue(flag))?;
    value
        .parse()
        .map_err(|_| CliError::InvalidNumber { flag, value })
}
