use crate::settings::Config;

/// Command-line overrides for the `[backtest]` and `[data]` sections.
///
/// Every field is optional; only the flags actually passed replace the values
/// loaded from file and environment.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct BacktestOverrides {
    /// Trailing estimation window, in trading days.
    #[cfg_attr(feature = "clap", arg(long))]
    pub window: Option<usize>,

    /// Rebalance frequency (weekly, monthly, quarterly).
    #[cfg_attr(feature = "clap", arg(long))]
    pub rebalance: Option<String>,

    /// Transaction cost in basis points of turnover.
    #[cfg_attr(feature = "clap", arg(long = "tc-bps"))]
    pub tc_bps: Option<f64>,

    /// Risk aversion of the mean-variance rule.
    #[cfg_attr(feature = "clap", arg(long))]
    pub gamma: Option<f64>,

    /// Covariance estimator (sample, ewma, shrinkage).
    #[cfg_attr(feature = "clap", arg(long = "cov-method"))]
    pub cov_method: Option<String>,

    /// Annualized volatility target of the vol-target strategy.
    #[cfg_attr(feature = "clap", arg(long = "target-vol"))]
    pub target_vol: Option<f64>,

    /// Leverage cap of the vol-target strategy.
    #[cfg_attr(feature = "clap", arg(long))]
    pub lmax: Option<f64>,

    /// Recompute returns from prices even if a cached file exists.
    #[cfg_attr(feature = "clap", arg(long = "force-refresh"))]
    pub force_refresh: bool,
}

impl BacktestOverrides {
    /// Writes every provided override into `config`.
    pub fn apply(&self, config: &mut Config) {
        let b = &mut config.backtest;
        if let Some(window) = self.window {
            b.window = window;
        }
        if let Some(rebalance) = &self.rebalance {
            b.rebalance = rebalance.clone();
        }
        if let Some(tc_bps) = self.tc_bps {
            b.tc_bps = tc_bps;
        }
        if let Some(gamma) = self.gamma {
            b.gamma = gamma;
        }
        if let Some(cov_method) = &self.cov_method {
            b.cov_method = cov_method.clone();
        }
        if let Some(target_vol) = self.target_vol {
            b.target_vol = target_vol;
        }
        if let Some(lmax) = self.lmax {
            b.lmax = lmax;
        }
        if self.force_refresh {
            config.data.force_refresh = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_provided_fields_are_overridden() {
        let mut config = Config::default();
        let overrides = BacktestOverrides {
            window: Some(30),
            cov_method: Some("ewma".to_string()),
            ..Default::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.backtest.window, 30);
        assert_eq!(config.backtest.cov_method, "ewma");
        assert_eq!(config.backtest.gamma, 10.0);
        assert!(!config.data.force_refresh);
    }
}
