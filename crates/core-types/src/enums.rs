use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one of the allocation rules the simulator runs side by side.
///
/// The declaration order is the canonical reporting order, which is why the
/// enum derives `Ord`: maps keyed by `StrategyId` iterate in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    EqualWeight,
    MinVariance,
    MeanVariance,
    RiskParity,
    VolTarget,
}

impl StrategyId {
    /// Every strategy, in reporting order.
    pub const ALL: [StrategyId; 5] = [
        StrategyId::EqualWeight,
        StrategyId::MinVariance,
        StrategyId::MeanVariance,
        StrategyId::RiskParity,
        StrategyId::VolTarget,
    ];

    /// The stable snake_case name used in tables and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::EqualWeight => "equal_weight",
            StrategyId::MinVariance => "min_variance",
            StrategyId::MeanVariance => "mean_variance",
            StrategyId::RiskParity => "risk_parity",
            StrategyId::VolTarget => "vol_target",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyId::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| CoreError::InvalidInput("strategy".to_string(), s.to_string()))
    }
}

/// How often target weights are recomputed, expressed in trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceFrequency {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
}

impl RebalanceFrequency {
    /// Number of trading days between two rebalances.
    pub fn trading_days(&self) -> usize {
        match self {
            RebalanceFrequency::Weekly => 5,
            RebalanceFrequency::Monthly => 21,
            RebalanceFrequency::Quarterly => 63,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RebalanceFrequency::Weekly => "weekly",
            RebalanceFrequency::Monthly => "monthly",
            RebalanceFrequency::Quarterly => "quarterly",
        }
    }

    /// Resolves a user-supplied label, falling back to `Monthly` for anything
    /// unrecognized.
    ///
    /// Unlike the covariance method, an unknown frequency is not an error. The
    /// fallback is logged so a typo in a config file is still visible.
    pub fn from_label_or_monthly(label: &str) -> Self {
        match label.parse() {
            Ok(freq) => freq,
            Err(_) => {
                tracing::warn!(
                    label = %label,
                    "Unrecognized rebalance frequency, falling back to monthly."
                );
                RebalanceFrequency::Monthly
            }
        }
    }
}

impl fmt::Display for RebalanceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RebalanceFrequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(RebalanceFrequency::Weekly),
            "monthly" => Ok(RebalanceFrequency::Monthly),
            "quarterly" => Ok(RebalanceFrequency::Quarterly),
            _ => Err(CoreError::InvalidInput(
                "rebalance frequency".to_string(),
                s.to_string(),
            )),
        }
    }
}

/// The covariance estimators available to the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CovarianceMethod {
    Sample,
    Ewma,
    #[default]
    Shrinkage,
}

impl CovarianceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CovarianceMethod::Sample => "sample",
            CovarianceMethod::Ewma => "ewma",
            CovarianceMethod::Shrinkage => "shrinkage",
        }
    }
}

impl fmt::Display for CovarianceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CovarianceMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sample" => Ok(CovarianceMethod::Sample),
            "ewma" => Ok(CovarianceMethod::Ewma),
            "shrinkage" => Ok(CovarianceMethod::Shrinkage),
            _ => Err(CoreError::InvalidInput(
                "covariance method".to_string(),
                s.to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names_round_trip_through_from_str() {
        for id in StrategyId::ALL {
            assert_eq!(id.as_str().parse::<StrategyId>().unwrap(), id);
        }
    }

    #[test]
    fn test_rebalance_step_lengths() {
        assert_eq!(RebalanceFrequency::Weekly.trading_days(), 5);
        assert_eq!(RebalanceFrequency::Monthly.trading_days(), 21);
        assert_eq!(RebalanceFrequency::Quarterly.trading_days(), 63);
    }

    #[test]
    fn test_unknown_frequency_falls_back_to_monthly() {
        assert_eq!(
            RebalanceFrequency::from_label_or_monthly("fortnightly"),
            RebalanceFrequency::Monthly
        );
        assert_eq!(
            RebalanceFrequency::from_label_or_monthly("Weekly"),
            RebalanceFrequency::Weekly
        );
    }

    #[test]
    fn test_unknown_covariance_method_is_an_error() {
        assert!("ledoit".parse::<CovarianceMethod>().is_err());
        assert_eq!("EWMA".parse::<CovarianceMethod>().unwrap(), CovarianceMethod::Ewma);
    }
}
