use crate::error::AnalyticsError;
use crate::report::PerformanceReport;
use crate::series::{drawdown_curve, mean, percentile, population_std};
use core_types::TRADING_DAYS_PER_YEAR;
use tracing::debug;

/// A stateless calculator for deriving performance metrics from a strategy's
/// daily returns.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `returns` - The strategy's net daily returns.
    /// * `turnover` - The strategy's daily turnover, aligned with `returns`.
    /// * `target_vol` - The annualized volatility target the run was configured with.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PerformanceReport` or an `AnalyticsError`.
    ///
    /// Returns are compounded as simple returns. A day below `-1` makes the
    /// growth product negative, and CAGR (with Sharpe, Sortino and Calmar
    /// derived from it) is then NaN.
    pub fn calculate(
        &self,
        returns: &[f64],
        turnover: &[f64],
        target_vol: f64,
    ) -> Result<PerformanceReport, AnalyticsError> {
        if returns.len() != turnover.len() {
            return Err(AnalyticsError::LengthMismatch {
                returns: returns.len(),
                turnover: turnover.len(),
            });
        }
        if returns.is_empty() {
            debug!("Empty return series, reporting zero metrics.");
            return Ok(PerformanceReport::empty(target_vol));
        }

        let mut report = PerformanceReport::default();
        self.calculate_return_and_risk(returns, &mut report);
        self.calculate_drawdown(returns, &mut report);
        self.calculate_tail_risk(returns, &mut report);

        report.avg_turnover = mean(turnover);
        report.realized_vol = report.vol;
        report.vol_minus_target = report.realized_vol - target_vol;

        Ok(report)
    }

    /// CAGR, annualized volatility, Sharpe and Sortino.
    fn calculate_return_and_risk(&self, returns: &[f64], report: &mut PerformanceReport) {
        let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
        let years = returns.len() as f64 / TRADING_DAYS_PER_YEAR;
        report.cagr = growth.powf(1.0 / years) - 1.0;

        let annualizer = TRADING_DAYS_PER_YEAR.sqrt();
        report.vol = population_std(returns) * annualizer;
        if report.vol > 0.0 {
            report.sharpe = report.cagr / report.vol;
        }

        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let downside_std = population_std(&downside);
        if downside_std > 0.0 {
            report.sortino = report.cagr / (downside_std * annualizer);
        }
    }

    /// Maximum drawdown of the growth curve, and Calmar from it.
    fn calculate_drawdown(&self, returns: &[f64], report: &mut PerformanceReport) {
        let max_drawdown = drawdown_curve(returns).into_iter().fold(0.0, f64::min);
        report.max_drawdown = max_drawdown;
        if max_drawdown < 0.0 {
            report.calmar = -report.cagr / max_drawdown;
        }
    }

    /// Historical 95% VaR and CVaR on daily returns.
    fn calculate_tail_risk(&self, returns: &[f64], report: &mut PerformanceReport) {
        let Some(var_95) = percentile(returns, 5.0) else {
            return;
        };
        let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var_95).collect();
        report.var_95 = var_95;
        report.cvar_95 = if tail.is_empty() { var_95 } else { mean(&tail) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hand_computed_series() {
        let returns = [0.02, -0.01, 0.03, -0.04, 0.01];
        let turnover = [0.5, 0.0, 0.0, 0.0, 0.25];
        let report = AnalyticsEngine::new().calculate(&returns, &turnover, 0.10).unwrap();

        assert_relative_eq!(report.cagr, 0.530121697152395, epsilon = 1e-9);
        assert_relative_eq!(report.vol, 0.39399492382516815, epsilon = 1e-9);
        assert_relative_eq!(report.sharpe, 1.345503876054078, epsilon = 1e-9);
        assert_relative_eq!(report.sortino, 2.226301865499579, epsilon = 1e-9);
        assert_relative_eq!(report.max_drawdown, -0.04, epsilon = 1e-12);
        assert_relative_eq!(report.calmar, 13.253042428809863, epsilon = 1e-8);
        assert_relative_eq!(report.avg_turnover, 0.15, epsilon = 1e-12);
        assert_relative_eq!(report.realized_vol, report.vol);
        assert_relative_eq!(report.vol_minus_target, report.vol - 0.10, epsilon = 1e-12);
        assert_relative_eq!(report.var_95, -0.034, epsilon = 1e-12);
        assert_relative_eq!(report.cvar_95, -0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_gains_have_no_risk_ratios() {
        let returns = vec![0.001; 252];
        let turnover = vec![0.0; 252];
        let report = AnalyticsEngine::new().calculate(&returns, &turnover, 0.10).unwrap();

        assert_relative_eq!(report.cagr, 1.001f64.powi(252) - 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.vol, 0.0, epsilon = 1e-12);
        assert_eq!(report.sortino, 0.0);
        assert_eq!(report.max_drawdown, 0.0);
        assert_eq!(report.calmar, 0.0);
        assert_relative_eq!(report.var_95, 0.001, epsilon = 1e-15);
        assert_relative_eq!(report.cvar_95, 0.001, epsilon = 1e-15);
    }

    #[test]
    fn test_empty_series_is_all_zero() {
        let report = AnalyticsEngine::new().calculate(&[], &[], 0.12).unwrap();
        assert_eq!(report, PerformanceReport::empty(0.12));
        assert_eq!(report.cagr, 0.0);
        assert_eq!(report.vol_minus_target, -0.12);
    }

    #[test]
    fn test_misaligned_turnover_is_rejected() {
        let err = AnalyticsEngine::new()
            .calculate(&[0.01, 0.02], &[0.0], 0.1)
            .unwrap_err();
        assert_eq!(err, AnalyticsError::LengthMismatch { returns: 2, turnover: 1 });
    }

    #[test]
    fn test_loss_beyond_total_makes_growth_ratios_nan() {
        let returns = [0.01, -1.5, 0.02, -0.01, 0.03];
        let report = AnalyticsEngine::new()
            .calculate(&returns, &[0.0; 5], 0.1)
            .unwrap();
        assert!(report.cagr.is_nan());
        assert!(report.sharpe.is_nan());
        assert!(report.sortino.is_nan());
        assert!(report.calmar.is_nan());
        assert!(report.vol.is_finite());
        assert!(report.var_95.is_finite());
    }
}
