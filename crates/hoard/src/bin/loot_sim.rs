//! # Loot Simulator
//!
//! Command-line tool to evaluate a loot table the way a peer would: same
//! seed derivation, same draw order, same checksum.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use hoard::report::{drops_report, inventory_report, statistics_report};
use hoard::{SimError, SimOptions, USAGE};
use hoard_core::DeterministicRandom;
use hoard_loot::{run_statistics, GeneratorConfig, LootTableAsset, LootTableInstance, PropertyConditions};
use tracing::info;

fn main() -> ExitCode {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         HOARD LOOT SIMULATOR                                     ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let options = match SimOptions::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            println!("Error: {e}");
            println!();
            println!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(options: &SimOptions) -> Result<(), SimError> {
    let config = match &options.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    let seed = options.seed.unwrap_or(config.seed);

    let name = table_name(&options.table);
    let text = fs::read_to_string(&options.table).map_err(|source| SimError::Read {
        path: options.table.clone(),
        source,
    })?;
    let asset = LootTableAsset::parse(&name, &text)?;
    let table = LootTableInstance::new(&asset, None);

    info!(table = %name, seed, runs = options.runs, "simulating loot table");

    println!("┌─ TABLE ──────────────────────────────────────────────────────────┐");
    println!("│ Name:               {name}");
    println!("│ Layers:             {}", asset.layers().len());
    println!("│ Nodes:              {}", table.loot().map_or(0, |schema| schema.len()));
    println!("│ Seed:               {seed}");
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    if options.runs > 1 {
        let stream_seed = DeterministicRandom::derive(seed, &name).seed();
        let stats = run_statistics(&table, &PropertyConditions, stream_seed, options.runs);
        println!("┌─ STATISTICS ({} passes)", options.runs);
        print!("{}", statistics_report(&stats));
        println!("└──────────────────────────────────────────────────────────────────┘");
        return Ok(());
    }

    let mut rng = DeterministicRandom::derive(seed, &name);
    let drops = table.evaluate(&PropertyConditions, &mut rng);
    println!("┌─ DROPS ───────────────────────────────────────────────────────────┐");
    print!("{}", drops_report(&drops, rng.draws()));
    println!("└──────────────────────────────────────────────────────────────────┘");

    if options.fill {
        let mut inventory = config.inventory();
        let leftovers = inventory.fill(drops, config.shuffle, &mut rng, &config.catalog());
        println!();
        println!("┌─ INVENTORY ───────────────────────────────────────────────────────┐");
        print!("{}", inventory_report(&inventory, &leftovers));
        println!("└──────────────────────────────────────────────────────────────────┘");
    }

    Ok(())
}

/// Tables are named by file stem, which is also the stream key.
fn table_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table")
        .to_string()
}
