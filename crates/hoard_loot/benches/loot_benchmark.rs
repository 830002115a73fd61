//! Benchmark for loot generation throughput.
//!
//! Run with: cargo bench --package hoard_loot --bench loot_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hoard_core::DeterministicRandom;
use hoard_loot::{
    compile_str, run_statistics, Inventory, ItemCatalog, LootTableAsset, LootTableInstance,
    PropertyConditions,
};

const DUNGEON_CHEST: &str = r#"{
    "loot": {
        "type": "collection",
        "count": {"min": 2, "max": 4},
        "components": [
            {"type": "item", "item": "coin", "chance": 90, "count": {"min": 5, "max": 40}},
            {"type": "selection", "chance": 60, "count": {"min": 1, "max": 2}, "components": [
                {"type": "item", "item": "sword", "chance": 30, "limit": 1, "componentTags": ["weapon"]},
                {"type": "item", "item": "shield", "chance": 30, "limit": 1, "componentTags": ["armor"]},
                {"type": "item", "item": "potion", "chance": 40, "count": {"min": 1, "max": 3}}
            ]},
            {"type": "selection", "chance": 5, "components": [
                {"type": "item", "item": "crown", "chance": 1, "limit": 1, "componentId": "crown"},
                {"type": "item", "item": "gem", "chance": 9}
            ]}
        ]
    },
    "disableByComponentTags": ["armor"]
}"#;

fn create_test_table() -> LootTableInstance {
    let asset = LootTableAsset::parse("dungeon_chest", DUNGEON_CHEST).expect("bench asset compiles");
    LootTableInstance::new(&asset, None)
}

fn benchmark_compile(c: &mut Criterion) {
    c.bench_function("compile_schema", |b| {
        b.iter(|| black_box(LootTableAsset::parse("dungeon_chest", black_box(DUNGEON_CHEST))));
    });

    let tree = r#"{"type": "selection", "components": [
        {"type": "item", "item": "gold", "count": 5, "limit": 1},
        {"type": "item", "item": "sword", "limit": 1}
    ]}"#;
    c.bench_function("compile_small_tree", |b| {
        b.iter(|| black_box(compile_str("small", black_box(tree))));
    });
}

fn benchmark_single_evaluation(c: &mut Criterion) {
    let table = create_test_table();
    let mut rng = DeterministicRandom::new(42);

    c.bench_function("single_evaluation", |b| {
        b.iter(|| black_box(table.evaluate(&PropertyConditions, &mut rng)));
    });
}

fn benchmark_hundred_thousand_evaluations(c: &mut Criterion) {
    let table = create_test_table();

    let mut group = c.benchmark_group("bulk_evaluation");
    group.throughput(Throughput::Elements(100_000));
    group.sample_size(10);

    group.bench_function("100k_evaluations", |b| {
        b.iter(|| black_box(run_statistics(&table, &PropertyConditions, 7, 100_000)));
    });

    group.finish();
}

fn benchmark_fill(c: &mut Criterion) {
    let table = create_test_table();
    let catalog = ItemCatalog::default();
    let mut rng = DeterministicRandom::new(9);

    c.bench_function("evaluate_and_fill_27_slots", |b| {
        b.iter(|| {
            let mut inventory = Inventory::new(27);
            black_box(table.fill(
                &PropertyConditions,
                &mut inventory,
                true,
                &catalog,
                &mut rng,
            ))
        });
    });
}

criterion_group!(
    benches,
    benchmark_compile,
    benchmark_single_evaluation,
    benchmark_hundred_thousand_evaluations,
    benchmark_fill
);
criterion_main!(benches);
