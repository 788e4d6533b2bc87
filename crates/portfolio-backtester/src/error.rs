use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Invalid backtest configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Not enough data for the chosen window length: {rows} rows, window {window}")]
    InsufficientData { rows: usize, window: usize },

    #[error("Covariance error: {0}")]
    Covariance(#[from] covariance::CovarianceError),

    #[error("Allocation error: {0}")]
    Allocation(#[from] allocation::AllocationError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
}
