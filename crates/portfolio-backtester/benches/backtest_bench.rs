//! Performance benchmarks for the rolling-window simulator.
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate};
use configuration::{BacktestSettings, CovarianceSettings, OptimizerSettings};
use core_types::ReturnSeries;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::DMatrix;
use portfolio_backtester::PortfolioManager;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Generate a synthetic return panel for benchmarking.
fn generate_returns(rows: usize, assets: usize) -> ReturnSeries {
    let mut rng = StdRng::seed_from_u64(7);
    let normal = Normal::new(0.0003, 0.01).unwrap();
    let start = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
    let dates = (0..rows).map(|i| start + Duration::days(i as i64)).collect();
    let names = (0..assets).map(|j| format!("ASSET{j}")).collect();
    ReturnSeries::new(dates, names, DMatrix::from_fn(rows, assets, |_, _| normal.sample(&mut rng))).unwrap()
}

fn bench_backtest(c: &mut Criterion) {
    let returns = generate_returns(1_000, 7);
    let mut group = c.benchmark_group("backtest");
    group.sample_size(10);

    for rebalance in ["weekly", "monthly"] {
        for parallel in [false, true] {
            let settings = BacktestSettings {
                rebalance: rebalance.to_string(),
                parallel_allocations: parallel,
                ..Default::default()
            };
            let manager =
                PortfolioManager::new(settings, CovarianceSettings::default(), &OptimizerSettings::default())
                    .unwrap();
            let id = BenchmarkId::new(rebalance, if parallel { "parallel" } else { "sequential" });
            group.bench_with_input(id, &returns, |b, returns| {
                b.iter(|| manager.run(black_box(returns)).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_backtest);
criterion_main!(benches);
