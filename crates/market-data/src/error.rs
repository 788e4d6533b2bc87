use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("An error occurred during JSON serialization: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed table at line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("Tickers not present in the price file: {0:?}")]
    MissingTickers(Vec<String>),

    #[error("Need at least two clean price rows to compute returns, found {0}")]
    NotEnoughPrices(usize),

    #[error("Invalid return table: {0}")]
    Core(#[from] core_types::CoreError),

    #[error("Could not derive report series: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
}

impl MarketDataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MarketDataError::Io {
            path: path.into(),
            source,
        }
    }
}
