use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; missing sections and fields
/// take the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backtest: BacktestSettings,
    pub covariance: CovarianceSettings,
    pub optimizer: OptimizerSettings,
    pub data: DataSettings,
    pub report: ReportSettings,
    pub logging: LoggingSettings,
}

/// Contains parameters for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    /// Trailing window length, in trading days, used for every estimate.
    pub window: usize,
    /// Rebalance frequency label ("weekly", "monthly", "quarterly").
    /// Unknown labels are tolerated and resolved to monthly by the simulator.
    pub rebalance: String,
    /// Transaction cost charged on turnover, in basis points.
    pub tc_bps: f64,
    /// Risk aversion for the mean-variance rule.
    pub gamma: f64,
    /// Covariance estimator name ("sample", "ewma", "shrinkage").
    pub cov_method: String,
    /// Annualized volatility the vol-target overlay aims for.
    pub target_vol: f64,
    /// Leverage cap for the vol-target overlay.
    pub lmax: f64,
    /// Evaluate the allocators of a rebalance day on the rayon pool.
    pub parallel_allocations: bool,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            window: 252,
            rebalance: "monthly".to_string(),
            tc_bps: 5.0,
            gamma: 10.0,
            cov_method: "shrinkage".to_string(),
            target_vol: 0.10,
            lmax: 1.5,
            parallel_allocations: true,
        }
    }
}

/// Parameters of the covariance estimators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CovarianceSettings {
    /// EWMA decay factor.
    pub ewma_lambda: f64,
    /// Weight put on the diagonal prior by the shrinkage estimator.
    pub shrinkage_intensity: f64,
    /// Eigenvalue floor applied by the PSD projection.
    pub psd_floor: f64,
}

impl Default for CovarianceSettings {
    fn default() -> Self {
        Self {
            ewma_lambda: 0.94,
            shrinkage_intensity: 0.1,
            psd_floor: 1e-6,
        }
    }
}

/// Iteration budgets for the numerical allocators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    pub risk_parity_max_iter: usize,
    pub risk_parity_tol: f64,
    pub solver_max_iter: usize,
    pub solver_tol: f64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            risk_parity_max_iter: 500,
            risk_parity_tol: 1e-8,
            solver_max_iter: 10_000,
            solver_tol: 1e-12,
        }
    }
}

/// Where market data lives on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Asset columns to keep from the price file. Empty keeps every column.
    pub tickers: Vec<String>,
    /// First date (inclusive) of the price history to use.
    pub start: NaiveDate,
    /// Last date (exclusive) of the price history to use.
    pub end: NaiveDate,
    /// Adjusted close prices, one column per asset.
    pub price_path: PathBuf,
    /// Cached log returns derived from `price_path`.
    pub returns_path: PathBuf,
    /// Ignore the returns cache and recompute it from prices.
    pub force_refresh: bool,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            tickers: ["SPY", "TLT", "IEF", "GLD", "EEM", "QQQ", "VNQ"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            start: NaiveDate::from_ymd_opt(2012, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            price_path: PathBuf::from("data/raw/prices.csv"),
            returns_path: PathBuf::from("data/processed/returns.csv"),
            force_refresh: false,
        }
    }
}

/// Output locations for exported result tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub output_dir: PathBuf,
    /// Trailing window for the exported rolling volatility series.
    pub rolling_vol_window: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports"),
            rolling_vol_window: 63,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file here.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
