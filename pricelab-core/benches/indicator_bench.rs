//! Criterion benchmarks for PriceLab hot paths.
//!
//! Benchmarks:
//! 1. Indicator transform over a multi-ticker table
//! 2. Rolling mean over a single long series
//! 3. Flat CSV export

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricelab_core::domain::PriceRow;
use pricelab_core::indicators::{add_indicators, rolling_mean, MA_WINDOW};
use pricelab_core::persist::flat::export_csv;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_rows(tickers: usize, days: usize) -> Vec<PriceRow> {
    let base = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let mut rows = Vec::with_capacity(tickers * days);
    for d in 0..days {
        let date = base + chrono::Duration::days(d as i64);
        for t in 0..tickers {
            let close = 100.0 + ((d + t * 7) as f64 * 0.1).sin() * 10.0;
            rows.push(PriceRow::new(date, format!("T{t:03}"), close));
        }
    }
    rows
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_add_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_indicators");
    for tickers in [1, 10, 50] {
        let rows = make_rows(tickers, 1_500);
        group.bench_with_input(BenchmarkId::from_parameter(tickers), &rows, |b, rows| {
            b.iter(|| add_indicators(black_box(rows)).unwrap())
        });
    }
    group.finish();
}

fn bench_rolling_mean(c: &mut Criterion) {
    let values: Vec<f64> = (0..10_000).map(|i| 100.0 + (i as f64 * 0.01).cos()).collect();
    c.bench_function("rolling_mean_10k", |b| {
        b.iter(|| rolling_mean(black_box(&values), MA_WINDOW))
    });
}

fn bench_export_csv(c: &mut Criterion) {
    let table = add_indicators(&make_rows(10, 1_500)).unwrap();
    c.bench_function("export_csv_10x1500", |b| {
        b.iter(|| export_csv(black_box(&table)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_add_indicators,
    bench_rolling_mean,
    bench_export_csv
);
criterion_main!(benches);
