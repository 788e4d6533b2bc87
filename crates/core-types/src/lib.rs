//! # Allocation Lab Core Types
//!
//! Shared vocabulary for every other crate in the workspace: the immutable
//! `ReturnSeries` panel the engine walks over, and the small enums that name
//! strategies, rebalance frequencies and covariance estimators.
//!
//! This is a Layer 0 crate. It depends on nothing else in the workspace.

pub mod enums;
pub mod error;
pub mod returns;
pub mod stats;

// Re-export the core types to provide a clean public API.
pub use enums::{CovarianceMethod, RebalanceFrequency, StrategyId};
pub use error::CoreError;
pub use returns::ReturnSeries;

/// Trading days per year used for every annualization in the workspace.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
