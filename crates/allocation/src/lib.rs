//! # Allocation Lab Allocators
//!
//! The allocation rules the backtester compares. Each rule maps the estimates of
//! a rebalance day (covariance, mean returns, trailing window) to a long-only
//! weight vector.
//!
//! ## Architectural Principles
//!
//! - **Pure Functions:** every rule is a pure function of its inputs. Nothing is
//!   remembered between rebalances, which is what lets the simulator evaluate
//!   the rules of one day in parallel without changing results.
//! - **Allocator Agnostic Engine:** the simulator drives rules through the
//!   `Allocator` trait and builds them with `create_allocator`, so it never
//!   needs to know which rule it is talking to.
//!
//! ## Public API
//!
//! - `Allocator`, `AllocationInputs`, `Allocation`: the trait seam.
//! - `create_allocator`: the factory keyed by `StrategyId`.
//! - `equal_weight`, `min_variance_weights`, `mean_variance_weights`,
//!   `risk_parity_weights`, `apply_vol_targeting`, `project_to_simplex`: the
//!   underlying functions.

pub mod error;
pub mod factory;
pub mod mean_variance;
pub mod min_variance;
pub mod risk_parity;
pub mod simplex;
pub mod solver;
pub mod vol_target;

pub use error::AllocationError;
pub use factory::create_allocator;
pub use mean_variance::{mean_variance_weights, MeanVariance};
pub use min_variance::{min_variance_weights, MinVariance};
pub use risk_parity::{risk_parity_weights, RiskParity};
pub use simplex::{equal_weight, is_on_simplex, project_to_simplex};
pub use solver::{minimize_on_simplex, QuadraticProgram, SolverOptions, SolverOutcome};
pub use vol_target::{apply_vol_targeting, VolTarget, VolTargetOverlay};

use core_types::StrategyId;
use nalgebra::{DMatrix, DVector};

/// Everything a rule may look at on a rebalance day.
///
/// All three views cover the same asset universe, in the same column order,
/// and the same trailing window.
#[derive(Debug, Clone, Copy)]
pub struct AllocationInputs<'a> {
    pub covariance: &'a DMatrix<f64>,
    pub mean_returns: &'a DVector<f64>,
    /// Trailing returns, rows = days, columns = assets.
    pub window: &'a DMatrix<f64>,
}

impl AllocationInputs<'_> {
    /// Checks that the three views agree on the number of assets and returns it.
    pub fn n_assets(&self) -> Result<usize, AllocationError> {
        let n = self.covariance.nrows();
        if n == 0 {
            return Err(AllocationError::EmptyUniverse);
        }
        check_dim("covariance columns", n, self.covariance.ncols())?;
        check_dim("mean returns", n, self.mean_returns.len())?;
        check_dim("return window columns", n, self.window.ncols())?;
        Ok(n)
    }
}

pub(crate) fn check_dim(what: &str, expected: usize, found: usize) -> Result<(), AllocationError> {
    if expected != found {
        return Err(AllocationError::DimensionMismatch {
            what: what.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

/// The weights produced by one rule on one rebalance day.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub weights: DVector<f64>,
    /// Present only for overlay rules such as vol targeting.
    pub overlay: Option<VolTargetOverlay>,
}

impl Allocation {
    pub fn fully_invested(weights: DVector<f64>) -> Self {
        Self { weights, overlay: None }
    }
}

/// The core trait that all allocation rules implement.
///
/// The `Send + Sync` bounds allow the simulator to evaluate the rules of a
/// rebalance day on the rayon pool.
pub trait Allocator: Send + Sync {
    /// The strategy this rule reports under.
    fn id(&self) -> StrategyId;

    /// Computes target weights for the given estimates.
    fn allocate(&self, inputs: &AllocationInputs<'_>) -> Result<Allocation, AllocationError>;
}

/// Uniform 1/n allocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWeight;

impl Allocator for EqualWeight {
    fn id(&self) -> StrategyId {
        StrategyId::EqualWeight
    }

    fn allocate(&self, inputs: &AllocationInputs<'_>) -> Result<Allocation, AllocationError> {
        let n = inputs.n_assets()?;
        Ok(Allocation::fully_invested(equal_weight(n)))
    }
}
