use crate::error::AllocationError;
use crate::simplex::{equal_weight, project_to_simplex};
use crate::solver::{minimize_on_simplex, QuadraticProgram, SolverOptions};
use crate::{Allocation, AllocationInputs, Allocator};
use core_types::StrategyId;
use nalgebra::{DMatrix, DVector};

/// Long-only minimum-variance weights: `argmin w'Cw` over the simplex.
///
/// Seeded at equal weight. The solver output is projected once more as a
/// numerical safety net.
pub fn min_variance_weights(
    cov: &DMatrix<f64>,
    options: SolverOptions,
) -> Result<DVector<f64>, AllocationError> {
    let n = cov.nrows();
    if n == 0 {
        return Err(AllocationError::EmptyUniverse);
    }

    // w'Cw == 0.5 * w'(2C)w
    let program = QuadraticProgram::new(cov * 2.0, DVector::zeros(n))?;
    let outcome = minimize_on_simplex(&program, &equal_weight(n), options);
    if !outcome.converged {
        tracing::debug!(iterations = outcome.iterations, "min-variance solve did not converge");
    }
    Ok(project_to_simplex(&outcome.weights))
}

#[derive(Debug, Clone, Default)]
pub struct MinVariance {
    solver: SolverOptions,
}

impl MinVariance {
    pub fn new(solver: SolverOptions) -> Self {
        Self { solver }
    }
}

impl Allocator for MinVariance {
    fn id(&self) -> StrategyId {
        StrategyId::MinVariance
    }

    fn allocate(&self, inputs: &AllocationInputs<'_>) -> Result<Allocation, AllocationError> {
        inputs.n_assets()?;
        let weights = min_variance_weights(inputs.covariance, self.solver)?;
        Ok(Allocation::fully_invested(weights))
    }
}
