//! # Allocation Lab Portfolio Backtester
//!
//! This crate provides the rolling-window engine that compares allocation rules
//! on a shared return history. It uses a "master clock" loop over trading days:
//! on rebalance days every strategy re-optimizes from the trailing window, on
//! all other days weights are carried forward, and transaction costs are charged
//! on the turnover each rebalance causes.

pub mod error;
pub mod manager;
pub mod result;
pub mod schedule;
pub mod state;

pub use error::PortfolioError;
pub use manager::{run_backtest, PortfolioManager};
pub use result::{BacktestResult, StrategyTrack, VolTargetRecord};
pub use schedule::RebalanceSchedule;
pub use state::{DayOutcome, StrategyState};
