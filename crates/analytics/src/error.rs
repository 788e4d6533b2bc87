use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Return series has {returns} observations but turnover series has {turnover}")]
    LengthMismatch { returns: usize, turnover: usize },

    #[error("Rolling window must be at least 2 observations, got {0}")]
    InvalidWindow(usize),
}
