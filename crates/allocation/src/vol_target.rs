use crate::error::AllocationError;
use crate::simplex::equal_weight;
use crate::{check_dim, Allocation, AllocationInputs, Allocator};
use core_types::stats::population_std;
use core_types::{StrategyId, TRADING_DAYS_PER_YEAR};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Keeps the leverage finite when the trailing window has zero volatility.
const VOL_EPS: f64 = 1e-8;

/// Outcome of scaling a risky bucket toward a volatility target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolTargetOverlay {
    /// Annualized volatility of the unscaled bucket over the window.
    pub realized_vol: f64,
    /// Scale applied to the risky weights, capped at `lmax`.
    pub leverage: f64,
    /// `max(0, 1 - sum(scaled weights))`, held as implicit cash.
    pub cash: f64,
}

/// Scales `weights` so the bucket's trailing volatility hits `target_vol`.
///
/// Realized volatility is the population standard deviation of the bucket's
/// daily returns over `recent_returns`, annualized with 252 days. The scaled
/// weights may sum to less than one (the residual is cash) or, with `lmax > 1`,
/// to more than one.
pub fn apply_vol_targeting(
    weights: &DVector<f64>,
    recent_returns: &DMatrix<f64>,
    target_vol: f64,
    lmax: f64,
) -> Result<(DVector<f64>, VolTargetOverlay), AllocationError> {
    check_dim("return window columns", weights.len(), recent_returns.ncols())?;

    let portfolio_returns = recent_returns * weights;
    let realized_vol = population_std(portfolio_returns.as_slice()) * TRADING_DAYS_PER_YEAR.sqrt();
    let leverage = (target_vol / (realized_vol + VOL_EPS)).min(lmax);

    let scaled = weights * leverage;
    let cash = (1.0 - scaled.sum()).max(0.0);

    Ok((scaled, VolTargetOverlay { realized_vol, leverage, cash }))
}

/// Equal weight scaled toward a volatility target.
///
/// The risky bucket is always the equal-weight portfolio; it is not
/// configurable.
#[derive(Debug, Clone)]
pub struct VolTarget {
    target_vol: f64,
    lmax: f64,
}

impl VolTarget {
    pub fn new(target_vol: f64, lmax: f64) -> Result<Self, AllocationError> {
        if !(target_vol > 0.0) {
            return Err(AllocationError::InvalidParameters(
                "target_vol must be positive".to_string(),
            ));
        }
        if !(lmax > 0.0) {
            return Err(AllocationError::InvalidParameters(
                "lmax must be positive".to_string(),
            ));
        }
        Ok(Self { target_vol, lmax })
    }
}

impl Allocator for VolTarget {
    fn id(&self) -> StrategyId {
        StrategyId::VolTarget
    }

    fn allocate(&self, inputs: &AllocationInputs<'_>) -> Result<Allocation, AllocationError> {
        let n = inputs.n_assets()?;
        let (weights, overlay) =
            apply_vol_targeting(&equal_weight(n), inputs.window, self.target_vol, self.lmax)?;
        Ok(Allocation {
            weights,
            overlay: Some(overlay),
        })
    }
}
