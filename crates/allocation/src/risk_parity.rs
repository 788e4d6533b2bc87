use crate::error::AllocationError;
use crate::simplex::{equal_weight, project_to_simplex};
use crate::{Allocation, AllocationInputs, Allocator};
use configuration::OptimizerSettings;
use core_types::StrategyId;
use nalgebra::{DMatrix, DVector};

/// Guards the multiplicative update against a zero risk contribution.
const CONTRIBUTION_EPS: f64 = 1e-12;

/// Equal-risk-contribution weights.
///
/// Starting from equal weight, each asset's weight is rescaled by
/// `target / (w_i * (Cw)_i + eps)` with `target = w'Cw / n`, then re-projected
/// onto the simplex. Stops after `max_iter` updates, once the contribution
/// deviations have norm below `tol`, or as soon as portfolio variance is not
/// positive. Hitting the cap returns the last iterate.
pub fn risk_parity_weights(
    cov: &DMatrix<f64>,
    max_iter: usize,
    tol: f64,
) -> Result<DVector<f64>, AllocationError> {
    let n = cov.nrows();
    if n == 0 {
        return Err(AllocationError::EmptyUniverse);
    }

    let mut w = equal_weight(n);
    let mut converged = false;
    for _ in 0..max_iter {
        let marginal = cov * &w;
        let port_var = w.dot(&marginal);
        if port_var <= 0.0 {
            break;
        }

        let contributions = w.component_mul(&marginal);
        let target = port_var / n as f64;
        if contributions.map(|rc| rc - target).norm() < tol {
            converged = true;
            break;
        }

        w = w.zip_map(&contributions, |wi, rc| wi * target / (rc + CONTRIBUTION_EPS));
        w = project_to_simplex(&w);
    }

    if !converged {
        tracing::debug!(max_iter, "risk parity stopped before contributions equalized");
    }
    Ok(project_to_simplex(&w))
}

#[derive(Debug, Clone)]
pub struct RiskParity {
    max_iter: usize,
    tol: f64,
}

impl RiskParity {
    pub fn new(settings: &OptimizerSettings) -> Self {
        Self {
            max_iter: settings.risk_parity_max_iter,
            tol: settings.risk_parity_tol,
        }
    }
}

impl Default for RiskParity {
    fn default() -> Self {
        Self::new(&OptimizerSettings::default())
    }
}

impl Allocator for RiskParity {
    fn id(&self) -> StrategyId {
        StrategyId::RiskParity
    }

    fn allocate(&self, inputs: &AllocationInputs<'_>) -> Result<Allocation, AllocationError> {
        inputs.n_assets()?;
        let weights = risk_parity_weights(inputs.covariance, self.max_iter, self.tol)?;
        Ok(Allocation::fully_invested(weights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_two_asset_fixed_point() {
        // rc_0 = 0.6 * 0.028 = rc_1 = 0.4 * 0.042 = 0.0168
        let cov = DMatrix::from_row_slice(2, 2, &[0.04, 0.01, 0.01, 0.09]);
        let w = risk_parity_weights(&cov, 500, 1e-8).unwrap();
        assert_relative_eq!(w[0], 0.6, epsilon = 1e-6);
        assert_relative_eq!(w[1], 0.4, epsilon = 1e-6);
    }

    #[test]
    fn test_iteration_cap_still_returns_simplex_weights() {
        let cov = DMatrix::from_diagonal(&DVector::from_vec(vec![0.01, 0.02, 0.04]));
        let w = risk_parity_weights(&cov, 3, 1e-12).unwrap();
        assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-8);
        assert!(w.iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn test_contributions_are_equalized() {
        let cov = DMatrix::from_row_slice(
            3,
            3,
            &[0.01, 0.002, 0.001, 0.002, 0.015, 0.003, 0.001, 0.003, 0.02],
        );
        let w = risk_parity_weights(&cov, 500, 1e-8).unwrap();
        let rc = w.component_mul(&(&cov * &w));
        let mean = rc.mean();
        for c in rc.iter() {
            assert_relative_eq!(*c, mean, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_zero_covariance_stops_at_equal_weight() {
        let cov = DMatrix::zeros(3, 3);
        let w = risk_parity_weights(&cov, 500, 1e-8).unwrap();
        assert_relative_eq!(w, equal_weight(3), epsilon = 1e-15);
    }
}
