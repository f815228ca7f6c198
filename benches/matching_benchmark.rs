// ============================================================================
// Matching Engine Benchmarks
// ============================================================================
//
// Benchmark Categories:
// 1. Full Matching - End-to-end order matching through the engine
// 2. Order Book Operations - Snapshot, cancel and resting submissions
// ============================================================================

use contract_orderbook::prelude::*;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use std::hint::black_box;
use std::sync::Arc;

fn open_engine() -> (MatchingEngine, Participant) {
    let engine = MatchingEngine::new(
        "ACME-IPO".to_string(),
        Box::new(PriceTimePriority::new()),
        Arc::new(NoOpEventHandler),
    );
    let admin = Participant::new(Role::Admin);
    engine
        .set_contract_state(&admin, ContractState::OrderbookOpen)
        .expect("terms -> orderbook_open");
    (engine, admin)
}

// ============================================================================
// Full Matching Engine Benchmarks
// End-to-end order submission and matching
// ============================================================================

fn benchmark_price_time_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("price_time_matching");

    for num_orders in [100u64, 1000, 10000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_orders),
            num_orders,
            |b, &num_orders| {
                let (engine, _) = open_engine();
                let seller = Participant::new(Role::Seller);
                let buyer = Participant::new(Role::Buyer);

                // Pre-populate order book with sell orders at different prices
                for i in 0..num_orders / 2 {
                    engine
                        .submit_order(&seller, Side::Sell, 1, Decimal::from(50_000 + i))
                        .expect("resting ask");
                }

                b.iter(|| {
                    // Replenish the best level, then take it
                    engine
                        .submit_order(&seller, Side::Sell, 1, Decimal::from(50_000))
                        .expect("resting ask");
                    black_box(engine.submit_order(&buyer, Side::Buy, 1, Decimal::from(50_005)))
                });
            },
        );
    }

    group.finish();
}

fn benchmark_level_sweep(c: &mut Criterion) {
    c.bench_function("level_sweep", |b| {
        b.iter_batched(
            || {
                let (engine, _) = open_engine();
                let seller = Participant::new(Role::Seller);
                for i in 0..100 {
                    engine
                        .submit_order(&seller, Side::Sell, 1, Decimal::from(50_000 + i * 10))
                        .expect("resting ask");
                }
                engine
            },
            |engine| {
                // Crosses the first 6 levels (50000-50050)
                let buyer = Participant::new(Role::Buyer);
                black_box(engine.submit_order(&buyer, Side::Buy, 5, Decimal::from(50_050)))
            },
            BatchSize::SmallInput,
        );
    });
}

// ============================================================================
// Order Book Operations Benchmarks
// ============================================================================

fn benchmark_order_book_snapshot(c: &mut Criterion) {
    c.bench_function("order_book_snapshot", |b| {
        let (engine, _) = open_engine();
        let investor = Participant::new(Role::Investor);

        // Pre-populate book with 100 levels on each side
        for i in 0..100 {
            engine
                .submit_order(&investor, Side::Buy, 1, Decimal::from(49_900 - i * 10))
                .expect("resting bid");
            engine
                .submit_order(&investor, Side::Sell, 1, Decimal::from(50_100 + i * 10))
                .expect("resting ask");
        }

        b.iter(|| black_box(engine.get_snapshot(10)));
    });
}

fn benchmark_order_submission_no_match(c: &mut Criterion) {
    c.bench_function("order_submission_no_match", |b| {
        let (engine, _) = open_engine();
        let seller = Participant::new(Role::Seller);

        // Submit order that won't match (empty book on other side)
        b.iter(|| black_box(engine.submit_order(&seller, Side::Sell, 1, Decimal::from(50_000))));
    });
}

fn benchmark_cancel(c: &mut Criterion) {
    c.bench_function("cancel_resting_order", |b| {
        let (engine, admin) = open_engine();
        let investor = Participant::new(Role::Investor);
        for i in 0..1000 {
            engine
                .submit_order(&investor, Side::Buy, 1, Decimal::from(40_000 + i % 50))
                .expect("resting bid");
        }

        b.iter(|| {
            let placed = engine
                .submit_order(&investor, Side::Buy, 1, Decimal::from(40_025))
                .expect("resting bid");
            black_box(engine.cancel_order(placed.order_id, &admin))
        });
    });
}

criterion_group!(
    benches,
    benchmark_price_time_matching,
    benchmark_level_sweep,
    benchmark_order_book_snapshot,
    benchmark_order_submission_no_match,
    benchmark_cancel,
);
criterion_main!(benches);
