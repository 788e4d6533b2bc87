//! # Allocation Lab Covariance Estimators
//!
//! Turns a trailing window of returns (rows = days, columns = assets) into a
//! covariance matrix the allocators can safely optimize against.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** pure functions over `nalgebra` matrices. No I/O and no
//!   state carried between calls; every estimate is rebuilt from its window.
//! - **PSD Guarantee:** whatever the method, `CovarianceEstimator::estimate`
//!   finishes with `ensure_psd`, so downstream quadratic programs never see an
//!   indefinite matrix.
//!
//! ## Public API
//!
//! - `CovarianceEstimator`: validated method + parameters, the entry point used
//!   by the simulator.
//! - `estimate`: one-shot helper taking the method by name.
//! - `sample_covariance`, `ewma_covariance`, `shrinkage_covariance`,
//!   `ensure_psd`, `mean_returns`: the building blocks.

pub mod error;
pub mod estimators;
pub mod psd;

pub use error::CovarianceError;
pub use estimators::{
    estimate, ewma_covariance, mean_returns, sample_covariance, shrinkage_covariance,
    CovarianceEstimator,
};
pub use psd::ensure_psd;
