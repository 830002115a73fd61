//! Text reports printed by the simulator.

use std::fmt::Write;

use hoard_loot::{drops_checksum, Inventory, LootDrop, LootStatistics};

/// One generation pass: each drop, then the peer checksum and draw count.
#[must_use]
pub fn drops_report(drops: &[LootDrop], draws: u64) -> String {
    let mut out = String::new();
    if drops.is_empty() {
        out.push_str("  (nothing)\n");
    }
    for drop in drops {
        let _ = writeln!(out, "  {drop}");
    }
    let _ = writeln!(out, "checksum: {:08x}", drops_checksum(drops));
    let _ = writeln!(out, "draws:    {draws}");
    out
}

/// Aggregated run: drop rate, then per-preset share and mean quantity.
#[must_use]
pub fn statistics_report(stats: &LootStatistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "passes:    {}", stats.total_rolls);
    let _ = writeln!(out, "drop rate: {:.2}%", stats.drop_rate_percent());
    let _ = writeln!(out, "draws:     {}", stats.total_draws);
    for (preset, appearances) in &stats.item_appearances {
        let total = stats.item_counts.get(preset).copied().unwrap_or(0);
        let _ = writeln!(
            out,
            "  {:<20} {:>6.2}%  x{:.2} avg",
            preset.as_str(),
            stats.share(preset.as_str()) * 100.0,
            total as f64 / *appearances as f64
        );
    }
    out
}

/// Occupied slots in index order, then the leftovers.
#[must_use]
pub fn inventory_report(inventory: &Inventory, leftovers: &[LootDrop]) -> String {
    let mut out = String::new();
    for (index, slot) in inventory.slots().enumerate() {
        if let Some(stack) = slot.stack() {
            let _ = writeln!(out, "  [{index:>2}] {} x{}", stack.preset, stack.count);
        }
    }
    let _ = writeln!(
        out,
        "slots used: {}/{}",
        inventory.used_slots(),
        inventory.capacity()
    );
    for drop in leftovers {
        let _ = writeln!(out, "  did not fit: {drop}");
    }
    out
}
