use crate::error::AllocationError;
use crate::simplex::{equal_weight, project_to_simplex};
use crate::solver::{minimize_on_simplex, QuadraticProgram, SolverOptions};
use crate::{check_dim, Allocation, AllocationInputs, Allocator};
use core_types::StrategyId;
use nalgebra::{DMatrix, DVector};

/// Long-only mean-variance weights: `argmin -mu'w + 0.5 * gamma * w'Cw` over the
/// simplex. Higher `gamma` means more risk averse; `gamma = 0` puts everything
/// on the asset with the highest expected return.
pub fn mean_variance_weights(
    mu: &DVector<f64>,
    cov: &DMatrix<f64>,
    gamma: f64,
    options: SolverOptions,
) -> Result<DVector<f64>, AllocationError> {
    let n = cov.nrows();
    if n == 0 {
        return Err(AllocationError::EmptyUniverse);
    }
    check_dim("mean returns", n, mu.len())?;
    if !(gamma >= 0.0) {
        return Err(AllocationError::InvalidParameters(format!(
            "gamma must be non-negative, got {}",
            gamma
        )));
    }

    let program = QuadraticProgram::new(cov * gamma, -mu)?;
    let outcome = minimize_on_simplex(&program, &equal_weight(n), options);
    if !outcome.converged {
        tracing::debug!(
            iterations = outcome.iterations,
            gamma,
            "mean-variance solve did not converge"
        );
    }
    Ok(project_to_simplex(&outcome.weights))
}

#[derive(Debug, Clone)]
pub struct MeanVariance {
    gamma: f64,
    solver: SolverOptions,
}

impl MeanVariance {
    pub fn new(gamma: f64, solver: SolverOptions) -> Result<Self, AllocationError> {
        if !(gamma >= 0.0) {
            return Err(AllocationError::InvalidParameters(
                "gamma must be non-negative".to_string(),
            ));
        }
        Ok(Self { gamma, solver })
    }
}

impl Allocator for MeanVariance {
    fn id(&self) -> StrategyId {
        StrategyId::MeanVariance
    }

    fn allocate(&self, inputs: &AllocationInputs<'_>) -> Result<Allocation, AllocationError> {
        inputs.n_assets()?;
        let weights =
            mean_variance_weights(inputs.mean_returns, inputs.covariance, self.gamma, self.solver)?;
        Ok(Allocation::fully_invested(weights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_high_risk_aversion_approaches_min_variance() {
        let cov = DMatrix::from_row_slice(2, 2, &[0.01, 0.0, 0.0, 0.04]);
        let mu = DVector::from_vec(vec![0.0, 0.0]);
        let w = mean_variance_weights(&mu, &cov, 1000.0, SolverOptions::default()).unwrap();
        assert_relative_eq!(w[0], 0.8, epsilon = 1e-8);
    }

    #[test]
    fn test_return_tilt_moves_weight_toward_higher_mean() {
        let cov = DMatrix::from_row_slice(2, 2, &[0.01, 0.0, 0.0, 0.01]);
        let mu = DVector::from_vec(vec![0.01, 0.03]);
        let w = mean_variance_weights(&mu, &cov, 5.0, SolverOptions::default()).unwrap();
        // Interior optimum: w1 - w0 = (mu1 - mu0) / (gamma * 0.01) = 0.4
        assert_relative_eq!(w[1] - w[0], 0.4, epsilon = 1e-8);
    }

    #[test]
    fn test_negative_gamma_is_rejected() {
        assert!(MeanVariance::new(-1.0, SolverOptions::default()).is_err());
    }
}
