//! # Allocation Lab Analytics Engine
//!
//! This crate turns a strategy's realized daily returns and turnover into a
//! scalar performance record. It acts as the "unbiased judge" of the system.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless calculator. It takes
//!   a return series as input and produces a `PerformanceReport` as output. This makes
//!   it highly reliable and easy to test.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `PerformanceReport`: The standardized struct that holds the 11 performance metrics.
//! - `series`: derived curves for reporting (cumulative growth, drawdowns, rolling vol).
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

pub mod engine;
pub mod error;
pub mod report;
pub mod series;

pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::PerformanceReport;
