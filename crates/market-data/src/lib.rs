//! # Allocation Lab Market Data Crate
//!
//! This crate is the system's file-system adapter. It turns a price CSV into the
//! `ReturnSeries` the backtester consumes, keeps a cached copy of the returns on
//! disk, and writes a finished backtest out as CSV/JSON tables.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** All file formats live here. The logic crates only ever see
//!   `ReturnSeries` and `BacktestResult`.
//! - **Cache, don't fetch:** Remote price download is someone else's job. This crate
//!   starts from a price file already on disk.
//!
//! ## Public API
//!
//! - `PriceTable`, `read_price_csv`: price ingest with row cleaning.
//! - `compute_log_returns`: prices to log returns.
//! - `ReturnRepository`: the cached returns file (`load_or_build`, `save`, `load`).
//! - `ReportWriter`: exports every result table into the report directory.
//! - `MarketDataError`: The specific error types that can be returned from this crate.

pub mod error;
pub mod export;
pub mod prices;
pub mod repository;
pub mod returns;

pub use error::MarketDataError;
pub use export::ReportWriter;
pub use prices::{read_price_csv, PriceTable};
pub use repository::ReturnRepository;
pub use returns::{compute_log_returns, read_returns_csv, write_returns_csv};

/// Date format of every CSV index column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
