use serde::{Deserialize, Serialize};

/// A standardized report of one strategy's performance.
///
/// This struct is the final output of the `AnalyticsEngine` and serves as the
/// row type of the metrics table. Field names serialize to the column labels
/// in `PerformanceReport::COLUMNS`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    // I. Return
    #[serde(rename = "CAGR")]
    pub cagr: f64,

    // II. Risk and Drawdown
    #[serde(rename = "Vol")]
    pub vol: f64,
    #[serde(rename = "Sharpe")]
    pub sharpe: f64, // 0 when vol is 0
    #[serde(rename = "Sortino")]
    pub sortino: f64, // 0 when there is no downside dispersion
    #[serde(rename = "MaxDrawdown")]
    pub max_drawdown: f64, // <= 0
    #[serde(rename = "Calmar")]
    pub calmar: f64, // 0 when there was no drawdown

    // III. Trading
    #[serde(rename = "AvgTurnover")]
    pub avg_turnover: f64,

    // IV. Volatility targeting
    #[serde(rename = "RealizedVol")]
    pub realized_vol: f64,
    #[serde(rename = "VolMinusTarget")]
    pub vol_minus_target: f64,

    // V. Tail risk (daily, not annualized)
    #[serde(rename = "VaR95")]
    pub var_95: f64,
    #[serde(rename = "CVaR95")]
    pub cvar_95: f64,
}

impl PerformanceReport {
    /// Column labels, in table order.
    pub const COLUMNS: [&'static str; 11] = [
        "CAGR",
        "Vol",
        "Sharpe",
        "Sortino",
        "MaxDrawdown",
        "Calmar",
        "AvgTurnover",
        "RealizedVol",
        "VolMinusTarget",
        "VaR95",
        "CVaR95",
    ];

    /// The record of a strategy that produced no returns.
    pub fn empty(target_vol: f64) -> Self {
        Self {
            vol_minus_target: -target_vol,
            ..Self::default()
        }
    }

    /// Metric values in the same order as `COLUMNS`.
    pub fn values(&self) -> [f64; 11] {
        [
            self.cagr,
            self.vol,
            self.sharpe,
            self.sortino,
            self.max_drawdown,
            self.calmar,
            self.avg_turnover,
            self.realized_vol,
            self.vol_minus_target,
            self.var_95,
            self.cvar_95,
        ]
    }
}
