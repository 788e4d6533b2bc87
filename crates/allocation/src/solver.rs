use crate::error::AllocationError;
use crate::simplex::project_to_simplex;
use configuration::OptimizerSettings;
use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// Smallest curvature used to size the gradient step. A flat objective (for
/// example mean-variance with `gamma = 0`) would otherwise divide by zero.
const MIN_LIPSCHITZ: f64 = 1e-12;

/// Caps a single step at this multiple of the linear term, so the simplex
/// projection never has to cancel huge offsets in floating point.
const MAX_LINEAR_MOVE: f64 = 1e3;

/// Iteration budget and stopping tolerance of the projected-gradient solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    pub max_iter: usize,
    /// The solver stops once an iterate moves less than this (Euclidean norm).
    pub tol: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self { max_iter: 10_000, tol: 1e-12 }
    }
}

impl From<&OptimizerSettings> for SolverOptions {
    fn from(settings: &OptimizerSettings) -> Self {
        Self {
            max_iter: settings.solver_max_iter,
            tol: settings.solver_tol,
        }
    }
}

/// The convex quadratic `0.5 * w'Qw + c'w`.
#[derive(Debug, Clone)]
pub struct QuadraticProgram {
    q: DMatrix<f64>,
    c: DVector<f64>,
}

impl QuadraticProgram {
    pub fn new(q: DMatrix<f64>, c: DVector<f64>) -> Result<Self, AllocationError> {
        if q.nrows() != q.ncols() {
            return Err(AllocationError::DimensionMismatch {
                what: "quadratic term columns".to_string(),
                expected: q.nrows(),
                found: q.ncols(),
            });
        }
        if c.len() != q.nrows() {
            return Err(AllocationError::DimensionMismatch {
                what: "linear term".to_string(),
                expected: q.nrows(),
                found: c.len(),
            });
        }
        Ok(Self { q, c })
    }

    pub fn dim(&self) -> usize {
        self.c.len()
    }

    pub fn value(&self, w: &DVector<f64>) -> f64 {
        0.5 * w.dot(&(&self.q * w)) + self.c.dot(w)
    }

    pub fn gradient(&self, w: &DVector<f64>) -> DVector<f64> {
        &self.q * w + &self.c
    }

    /// `1/L`, with `L` the largest eigenvalue of the symmetric part of `Q`
    /// (the Lipschitz constant of the gradient). Shorter steps stay convergent,
    /// so nearly flat objectives get a step bounded by the linear term instead.
    fn step_size(&self) -> f64 {
        let sym = (&self.q + self.q.transpose()) * 0.5;
        let lipschitz = SymmetricEigen::new(sym).eigenvalues.max();
        let linear_scale = self.c.amax() / MAX_LINEAR_MOVE;
        1.0 / lipschitz.max(linear_scale).max(MIN_LIPSCHITZ)
    }
}

/// Result of a constrained solve.
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    pub weights: DVector<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// Minimizes `program` over the probability simplex, which is exactly the
/// long-only, fully invested set `{sum(w) = 1, 0 <= w <= 1}`.
///
/// Accelerated projected gradient (FISTA) with a fixed `1/L` step and a
/// function-value restart of the momentum. Running out of iterations is not an
/// error: the last iterate is returned with `converged = false`.
pub fn minimize_on_simplex(
    program: &QuadraticProgram,
    start: &DVector<f64>,
    options: SolverOptions,
) -> SolverOutcome {
    let step = program.step_size();

    let mut x = project_to_simplex(start);
    let mut y = x.clone();
    let mut t = 1.0_f64;
    let mut f_x = program.value(&x);

    for iteration in 1..=options.max_iter {
        let x_next = project_to_simplex(&(&y - program.gradient(&y) * step));
        let f_next = program.value(&x_next);
        let moved = (&x_next - &x).norm();

        if f_next > f_x {
            // Momentum overshot; restart from the plain projected step.
            t = 1.0;
            y = x_next.clone();
        } else {
            let t_next = 0.5 * (1.0 + (1.0 + 4.0 * t * t).sqrt());
            y = &x_next + (&x_next - &x) * ((t - 1.0) / t_next);
            t = t_next;
        }

        x = x_next;
        f_x = f_next;

        if moved < options.tol {
            return SolverOutcome {
                weights: x,
                iterations: iteration,
                converged: true,
            };
        }
    }

    tracing::debug!(
        max_iter = options.max_iter,
        dim = program.dim(),
        "Simplex QP hit its iteration cap; returning best effort iterate."
    );
    SolverOutcome {
        weights: x,
        iterations: options.max_iter,
        converged: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simplex::equal_weight;
    use approx::assert_relative_eq;

    #[test]
    fn test_diagonal_min_variance_is_inverse_variance() {
        // min w'Dw on the simplex -> w_i proportional to 1/d_i.
        let q = DMatrix::from_diagonal(&DVector::from_vec(vec![2.0 * 0.01, 2.0 * 0.04]));
        let program = QuadraticProgram::new(q, DVector::zeros(2)).unwrap();
        let outcome = minimize_on_simplex(&program, &equal_weight(2), SolverOptions::default());

        assert!(outcome.converged);
        assert_relative_eq!(outcome.weights[0], 0.8, epsilon = 1e-8);
        assert_relative_eq!(outcome.weights[1], 0.2, epsilon = 1e-8);
    }

    #[test]
    fn test_flat_objective_goes_to_best_linear_vertex() {
        let program = QuadraticProgram::new(
            DMatrix::zeros(3, 3),
            DVector::from_vec(vec![-0.01, -0.03, -0.02]),
        )
        .unwrap();
        let outcome = minimize_on_simplex(&program, &equal_weight(3), SolverOptions::default());
        assert_relative_eq!(outcome.weights, DVector::from_vec(vec![0.0, 1.0, 0.0]), epsilon = 1e-12);
    }

    #[test]
    fn test_iteration_cap_is_best_effort() {
        let q = DMatrix::from_row_slice(2, 2, &[0.02, 0.0, 0.0, 0.08]);
        let program = QuadraticProgram::new(q, DVector::zeros(2)).unwrap();
        let outcome = minimize_on_simplex(
            &program,
            &DVector::from_vec(vec![0.0, 1.0]),
            SolverOptions { max_iter: 1, tol: 0.0 },
        );
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert_relative_eq!(outcome.weights.sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mismatched_linear_term_is_rejected() {
        let err = QuadraticProgram::new(DMatrix::identity(3, 3), DVector::zeros(2)).unwrap_err();
        assert!(matches!(err, AllocationError::DimensionMismatch { .. }));
    }
}
