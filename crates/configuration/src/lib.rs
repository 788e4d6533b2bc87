use crate::error::ConfigError;
use core_types::CovarianceMethod;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod overrides;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use overrides::BacktestOverrides;
pub use settings::{
    BacktestSettings, Config, CovarianceSettings, DataSettings, LoggingSettings,
    OptimizerSettings, ReportSettings,
};

/// Prefix for environment overrides, e.g. `ALLOCLAB__BACKTEST__WINDOW=126`.
pub const ENV_PREFIX: &str = "ALLOCLAB";

/// Loads the application configuration from the `config.toml` file.
///
/// The file is optional: a missing `config.toml` yields the defaults, still
/// subject to environment overrides.
pub fn load_config() -> Result<Config, ConfigError> {
    build(config::File::with_name("config.toml").required(false))
}

/// Loads the configuration from an explicit path, which must exist.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    build(config::File::from(path).required(true))
}

fn build<S>(file: S) -> Result<Config, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("data.tickers"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

impl Config {
    /// Rejects values no run could succeed with.
    ///
    /// The rebalance label is deliberately not checked here: an unknown
    /// frequency falls back to monthly at simulation time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.backtest;
        if b.window == 0 {
            return Err(invalid("backtest.window must be at least 1"));
        }
        if !(b.tc_bps >= 0.0) {
            return Err(invalid("backtest.tc_bps must be non-negative"));
        }
        if !(b.gamma >= 0.0) {
            return Err(invalid("backtest.gamma must be non-negative"));
        }
        if !(b.target_vol > 0.0) {
            return Err(invalid("backtest.target_vol must be positive"));
        }
        if !(b.lmax > 0.0) {
            return Err(invalid("backtest.lmax must be positive"));
        }
        b.cov_method
            .parse::<CovarianceMethod>()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        let c = &self.covariance;
        if !(c.ewma_lambda > 0.0 && c.ewma_lambda < 1.0) {
            return Err(invalid("covariance.ewma_lambda must lie in (0, 1)"));
        }
        if !(0.0..=1.0).contains(&c.shrinkage_intensity) {
            return Err(invalid("covariance.shrinkage_intensity must lie in [0, 1]"));
        }
        if !(c.psd_floor > 0.0) {
            return Err(invalid("covariance.psd_floor must be positive"));
        }

        let o = &self.optimizer;
        if o.risk_parity_max_iter == 0 || o.solver_max_iter == 0 {
            return Err(invalid("optimizer iteration caps must be at least 1"));
        }
        if !(o.risk_parity_tol > 0.0 && o.solver_tol > 0.0) {
            return Err(invalid("optimizer tolerances must be positive"));
        }

        if self.data.start >= self.data.end {
            return Err(invalid("data.start must be before data.end"));
        }
        if self.report.rolling_vol_window < 2 {
            return Err(invalid("report.rolling_vol_window must be at least 2"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::ValidationError(msg.to_string())
}
