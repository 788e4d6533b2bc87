use analytics::PerformanceReport;
use chrono::NaiveDate;
use configuration::BacktestSettings;
use core_types::StrategyId;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The daily history of one strategy over the simulated days.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyTrack {
    pub strategy: StrategyId,
    /// Net daily returns.
    pub returns: Vec<f64>,
    pub turnover: Vec<f64>,
    /// Held weights, rows = simulated days, columns = assets.
    pub weights: DMatrix<f64>,
}

/// One vol-target rebalance, for the volatility-targeting diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolTargetRecord {
    pub date: NaiveDate,
    pub realized_vol: f64,
    pub leverage: f64,
    pub cash: f64,
}

/// Everything a backtest run produced. Immutable once returned.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    /// The simulated days: every input date from index `window` onward.
    pub dates: Vec<NaiveDate>,
    pub assets: Vec<String>,
    /// One track per strategy, in `StrategyId::ALL` order.
    pub tracks: Vec<StrategyTrack>,
    pub metrics: BTreeMap<StrategyId, PerformanceReport>,
    pub vol_target_log: Vec<VolTargetRecord>,
    /// The settings the run actually used.
    pub settings: BacktestSettings,
}

impl BacktestResult {
    pub fn track(&self, strategy: StrategyId) -> Option<&StrategyTrack> {
        self.tracks.iter().find(|t| t.strategy == strategy)
    }

    pub fn metrics_for(&self, strategy: StrategyId) -> Option<&PerformanceReport> {
        self.metrics.get(&strategy)
    }

    pub fn strategies(&self) -> impl Iterator<Item = StrategyId> + '_ {
        self.tracks.iter().map(|t| t.strategy)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
