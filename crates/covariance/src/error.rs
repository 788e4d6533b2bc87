use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CovarianceError {
    #[error("Invalid covariance configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Cannot estimate a covariance matrix from an empty window ({rows} rows x {cols} assets)")]
    EmptyWindow { rows: usize, cols: usize },
}
