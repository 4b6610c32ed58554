//! Benchmarks for convex-basket construction.
//!
//! Run with: cargo bench -p convex-basket

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;

use convex_basket::prelude::*;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

fn create_test_bond(id: usize) -> BondRecord {
    let sectors = ["Industrial", "Financial", "Utility", "Energy", "Technology"];
    let ratings = [
        CreditRating::AA,
        CreditRating::A,
        CreditRating::AMinus,
        CreditRating::BBBPlus,
        CreditRating::BBB,
        CreditRating::BBPlus,
        CreditRating::B,
    ];

    BondRecord::builder()
        .isin(format!("US{:010}", id))
        .sector(sectors[id % sectors.len()])
        .rating(ratings[id % ratings.len()])
        .duration(0.5 + (id % 150) as f64 / 10.0)
        .liquidity_score(1.0 + (id * 37 % 99) as f64)
        .amount_outstanding(Decimal::from(100_000_000 + (id % 40) as i64 * 25_000_000))
        .yield_to_maturity(0.03 + (id % 50) as f64 / 1000.0)
        .build()
        .unwrap()
}

fn create_test_universe(size: usize) -> Universe {
    Universe::new((0..size).map(create_test_bond).collect()).unwrap()
}

fn create_test_specs(count: usize) -> Vec<BasketSpec> {
    let sectors = ["Industrial", "Financial", "Utility", "Energy", "Technology"];
    (0..count)
        .map(|i| {
            BasketSpec::sector_rating(sectors[i % sectors.len()], RatingFilter::InvestmentGrade)
                .with_size_limit(50)
                .with_weighting(WeightingMethod::liquidity())
        })
        .collect()
}

// =============================================================================
// SINGLE BASKET BENCHMARKS
// =============================================================================

fn bench_sector_basket(c: &mut Criterion) {
    let constructor = BasketConstructor::new();
    let spec = BasketSpec::sector("Industrial")
        .with_size_limit(100)
        .with_weighting(WeightingMethod::liquidity());

    let mut group = c.benchmark_group("sector_basket");
    for size in [1_000, 10_000, 50_000].iter() {
        let universe = create_test_universe(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &universe, |b, universe| {
            b.iter(|| constructor.build_basket(black_box(&spec), black_box(universe)))
        });
    }
    group.finish();
}

fn bench_similarity_basket(c: &mut Criterion) {
    let constructor = BasketConstructor::new();
    let config = SimilarityConfig::new()
        .with_max_duration_diff(2.0)
        .with_max_rating_notches(3);
    let spec = BasketSpec::similarity(format!("US{:010}", 0), config).with_size_limit(25);

    let mut group = c.benchmark_group("similarity_basket");
    for size in [1_000, 10_000, 50_000].iter() {
        let universe = create_test_universe(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &universe, |b, universe| {
            b.iter(|| constructor.build_basket(black_box(&spec), black_box(universe)))
        });
    }
    group.finish();
}

fn bench_weighting(c: &mut Criterion) {
    let universe = create_test_universe(5_000);
    let bonds: Vec<&BondRecord> = universe.iter().collect();

    let mut group = c.benchmark_group("weighting");
    group.throughput(Throughput::Elements(bonds.len() as u64));
    for strategy in [
        WeightingStrategy::Equal,
        WeightingStrategy::AmountOutstanding,
        WeightingStrategy::Liquidity { power: 1.5 },
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(strategy.method().code()),
            &strategy,
            |b, strategy| b.iter(|| strategy.compute_weights(black_box(&bonds))),
        );
    }
    group.finish();
}

// =============================================================================
// BATCH BENCHMARKS
// =============================================================================

fn bench_batch_sequential(c: &mut Criterion) {
    let universe = create_test_universe(10_000);
    let constructor = BasketConstructor::with_config(ConstructionConfig::sequential());

    let mut group = c.benchmark_group("batch_sequential");
    group.sample_size(30);

    for num_specs in [5, 20, 50].iter() {
        let specs = create_test_specs(*num_specs);

        group.throughput(Throughput::Elements(*num_specs as u64));
        group.bench_with_input(BenchmarkId::from_parameter(num_specs), &specs, |b, specs| {
            b.iter(|| constructor.build_baskets(black_box(specs), black_box(&universe)))
        });
    }
    group.finish();
}

fn bench_batch_parallel(c: &mut Criterion) {
    let universe = create_test_universe(10_000);
    let constructor = BasketConstructor::with_config(ConstructionConfig::new().with_threshold(4));

    let mut group = c.benchmark_group("batch_parallel");
    group.sample_size(30);

    for num_specs in [5, 20, 50].iter() {
        let specs = create_test_specs(*num_specs);

        group.throughput(Throughput::Elements(*num_specs as u64));
        group.bench_with_input(BenchmarkId::from_parameter(num_specs), &specs, |b, specs| {
            b.iter(|| constructor.build_baskets(black_box(specs), black_box(&universe)))
        });
    }
    group.finish();
}

criterion_group!(
    single_basket,
    bench_sector_basket,
    bench_similarity_basket,
    bench_weighting,
);

criterion_group!(batch, bench_batch_sequential, bench_batch_parallel,);

criterion_main!(single_basket, batch);
