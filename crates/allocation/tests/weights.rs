use allocation::{
    create_allocator, equal_weight, mean_variance_weights, min_variance_weights,
    risk_parity_weights, AllocationInputs, SolverOptions,
};
use approx::assert_relative_eq;
use configuration::{BacktestSettings, OptimizerSettings};
use core_types::StrategyId;
use nalgebra::{DMatrix, DVector};
use rstest::{fixture, rstest};

struct Estimates {
    cov: DMatrix<f64>,
    mu: DVector<f64>,
    window: DMatrix<f64>,
}

#[fixture]
fn estimates() -> Estimates {
    let cov = DMatrix::from_row_slice(
        3,
        3,
        &[0.01, 0.002, 0.001, 0.002, 0.015, 0.003, 0.001, 0.003, 0.02],
    );
    let mu = DVector::from_vec(vec![0.08, 0.06, 0.07]);
    let window = DMatrix::from_fn(40, 3, |i, j| {
        let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
        sign * 0.005 * (j + 1) as f64
    });
    Estimates { cov, mu, window }
}

fn assert_long_only(w: &DVector<f64>) {
    assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-8);
    assert!(w.iter().all(|&x| x >= -1e-8), "negative weight in {w}");
}

#[rstest]
fn test_optimizers_return_long_only_fully_invested_weights(estimates: Estimates) {
    let options = SolverOptions::default();
    assert_long_only(&equal_weight(3));
    assert_long_only(&min_variance_weights(&estimates.cov, options).unwrap());
    assert_long_only(&mean_variance_weights(&estimates.mu, &estimates.cov, 5.0, options).unwrap());
    assert_long_only(&risk_parity_weights(&estimates.cov, 500, 1e-8).unwrap());
}

#[rstest]
fn test_risk_parity_favors_the_quietest_asset(estimates: Estimates) {
    let w = risk_parity_weights(&estimates.cov, 500, 1e-8).unwrap();
    assert!(w[0] >= w[2]);
}

#[rstest]
fn test_min_variance_beats_equal_weight(estimates: Estimates) {
    let w = min_variance_weights(&estimates.cov, SolverOptions::default()).unwrap();
    let ew = equal_weight(3);
    let var = |x: &DVector<f64>| x.dot(&(&estimates.cov * x));
    assert!(var(&w) <= var(&ew) + 1e-12);
}

#[rstest]
fn test_every_allocator_accepts_consistent_inputs(estimates: Estimates) {
    let inputs = AllocationInputs {
        covariance: &estimates.cov,
        mean_returns: &estimates.mu,
        window: &estimates.window,
    };
    let backtest = BacktestSettings::default();
    let optimizer = OptimizerSettings::default();

    for id in StrategyId::ALL {
        let allocation = create_allocator(id, &backtest, &optimizer)
            .unwrap()
            .allocate(&inputs)
            .unwrap();
        assert_eq!(allocation.weights.len(), 3);
        assert_eq!(allocation.overlay.is_some(), id == StrategyId::VolTarget);
        if id != StrategyId::VolTarget {
            assert_long_only(&allocation.weights);
        }
    }
}

#[rstest]
fn test_mismatched_window_is_rejected(estimates: Estimates) {
    let narrow = DMatrix::zeros(10, 2);
    let inputs = AllocationInputs {
        covariance: &estimates.cov,
        mean_returns: &estimates.mu,
        window: &narrow,
    };
    let allocator = create_allocator(
        StrategyId::EqualWeight,
        &BacktestSettings::default(),
        &OptimizerSettings::default(),
    )
    .unwrap();
    assert!(allocator.allocate(&inputs).is_err());
}
