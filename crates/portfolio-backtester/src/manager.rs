use crate::error::PortfolioError;
use crate::result::{BacktestResult, StrategyTrack, VolTargetRecord};
use crate::schedule::RebalanceSchedule;
use crate::state::StrategyState;
use allocation::{create_allocator, Allocation, AllocationInputs, Allocator};
use analytics::AnalyticsEngine;
use configuration::{BacktestSettings, Config, CovarianceSettings, OptimizerSettings};
use core_types::{ReturnSeries, StrategyId};
use covariance::{mean_returns, CovarianceEstimator};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Called after every simulated day with `(days_done, days_total)`.
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Drives the rolling-window simulation for every strategy at once.
///
/// All inputs are validated when the manager is built, so `run` can only fail
/// on the data it is handed.
pub struct PortfolioManager {
    settings: BacktestSettings,
    schedule: RebalanceSchedule,
    estimator: CovarianceEstimator,
    allocators: Vec<Box<dyn Allocator>>,
    analytics_engine: AnalyticsEngine,
    progress: Option<ProgressCallback>,
}

impl PortfolioManager {
    pub fn new(
        settings: BacktestSettings,
        covariance: CovarianceSettings,
        optimizer: &OptimizerSettings,
    ) -> Result<Self, PortfolioError> {
        validate_settings(&settings)?;

        let estimator = CovarianceEstimator::from_name(&settings.cov_method, covariance)
            .map_err(|e| PortfolioError::InvalidConfiguration(e.to_string()))?;
        let schedule = RebalanceSchedule::from_label(&settings.rebalance);
        let allocators = StrategyId::ALL
            .iter()
            .map(|&id| {
                create_allocator(id, &settings, optimizer)
                    .map_err(|e| PortfolioError::InvalidConfiguration(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            settings,
            schedule,
            estimator,
            allocators,
            analytics_engine: AnalyticsEngine::new(),
            progress: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, PortfolioError> {
        Self::new(
            config.backtest.clone(),
            config.covariance.clone(),
            &config.optimizer,
        )
    }

    /// Registers an observer invoked once per simulated day.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Number of days `run` will simulate for a history of `rows` days.
    pub fn simulated_days(&self, rows: usize) -> usize {
        rows.saturating_sub(self.settings.window)
    }

    /// Runs the backtest over `returns`.
    ///
    /// Fails with `InsufficientData` when the history is not longer than the
    /// window. No partial result is ever returned.
    pub fn run(&self, returns: &ReturnSeries) -> Result<BacktestResult, PortfolioError> {
        let rows = returns.len();
        let window = self.settings.window;
        if rows <= window {
            return Err(PortfolioError::InsufficientData { rows, window });
        }

        let n_assets = returns.n_assets();
        let days = rows - window;
        let cost_rate = self.settings.tc_bps / 10_000.0;

        info!(
            assets = n_assets,
            days,
            window,
            rebalance = %self.schedule.frequency(),
            cov_method = %self.estimator.method(),
            parallel = self.settings.parallel_allocations,
            "Starting rolling-window backtest."
        );

        let mut schedule = self.schedule.clone();
        let mut states: Vec<StrategyState> = self
            .allocators
            .iter()
            .map(|a| StrategyState::new(a.id(), n_assets))
            .collect();
        let mut tracks: Vec<StrategyTrack> = states
            .iter()
            .map(|state| StrategyTrack {
                strategy: state.strategy(),
                returns: Vec::with_capacity(days),
                turnover: Vec::with_capacity(days),
                weights: DMatrix::zeros(days, n_assets),
            })
            .collect();
        let mut vol_target_log = Vec::new();
        let mut rebalances = 0usize;

        // --- Main "Master Clock" Loop ---
        for (day, i) in (window..rows).enumerate() {
            let date = returns.dates()[i];
            let todays_returns = returns.row(i);

            // 1. On rebalance days every strategy re-optimizes from the trailing window.
            let mut targets: Vec<Option<DVector<f64>>> = vec![None; states.len()];
            if schedule.is_due(i) {
                let trailing = returns.trailing_window(i, window);
                let covariance = self.estimator.estimate(&trailing)?;
                let mu = mean_returns(&trailing);
                let inputs = AllocationInputs {
                    covariance: &covariance,
                    mean_returns: &mu,
                    window: &trailing,
                };

                for (slot, allocation) in targets.iter_mut().zip(self.allocate_all(&inputs)?) {
                    if let Some(overlay) = allocation.overlay {
                        vol_target_log.push(VolTargetRecord {
                            date,
                            realized_vol: overlay.realized_vol,
                            leverage: overlay.leverage,
                            cash: overlay.cash,
                        });
                    }
                    *slot = Some(allocation.weights);
                }

                schedule.mark_rebalanced(i);
                rebalances += 1;
                debug!(%date, day = i, "Rebalanced all strategies.");
            }

            // 2. Charge costs, realize the day's return and record the history.
            for ((state, track), target) in states.iter_mut().zip(tracks.iter_mut()).zip(targets) {
                let outcome = state.advance(target, &todays_returns, cost_rate);
                track.returns.push(outcome.net_return);
                track.turnover.push(outcome.turnover);
                track.weights.row_mut(day).copy_from(&state.weights().transpose());
            }

            if let Some(progress) = &self.progress {
                progress(day + 1, days);
            }
        }

        // 3. Score every strategy on its realized history.
        let mut metrics = BTreeMap::new();
        for track in &tracks {
            let report = self.analytics_engine.calculate(
                &track.returns,
                &track.turnover,
                self.settings.target_vol,
            )?;
            metrics.insert(track.strategy, report);
        }

        info!(days, rebalances, "Backtest complete.");

        Ok(BacktestResult {
            dates: returns.dates()[window..].to_vec(),
            assets: returns.assets().to_vec(),
            tracks,
            metrics,
            vol_target_log,
            settings: self.settings.clone(),
        })
    }

    /// Evaluates every allocator on the same inputs, in strategy order.
    fn allocate_all(&self, inputs: &AllocationInputs<'_>) -> Result<Vec<Allocation>, PortfolioError> {
        let allocations = if self.settings.parallel_allocations {
            self.allocators
                .par_iter()
                .map(|allocator| allocator.allocate(inputs))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            self.allocators
                .iter()
                .map(|allocator| allocator.allocate(inputs))
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(allocations)
    }
}

fn validate_settings(settings: &BacktestSettings) -> Result<(), PortfolioError> {
    let problem = if settings.window < 1 {
        Some("window must be at least 1".to_string())
    } else if !(settings.tc_bps >= 0.0 && settings.tc_bps.is_finite()) {
        Some(format!("tc_bps must be non-negative, got {}", settings.tc_bps))
    } else if !(settings.gamma >= 0.0 && settings.gamma.is_finite()) {
        Some(format!("gamma must be non-negative, got {}", settings.gamma))
    } else if !(settings.target_vol > 0.0) {
        Some(format!("target_vol must be positive, got {}", settings.target_vol))
    } else if !(settings.lmax > 0.0) {
        Some(format!("lmax must be positive, got {}", settings.lmax))
    } else {
        None
    };
    match problem {
        Some(msg) => Err(PortfolioError::InvalidConfiguration(msg)),
        None => Ok(()),
    }
}

/// Runs a backtest with every setting taken from `config`.
pub fn run_backtest(returns: &ReturnSeries, config: &Config) -> Result<BacktestResult, PortfolioError> {
    PortfolioManager::from_config(config)?.run(returns)
}
