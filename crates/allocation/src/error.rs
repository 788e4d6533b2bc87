use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("Allocation requires at least one asset")]
    EmptyUniverse,

    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid allocator parameters: {0}")]
    InvalidParameters(String),
}
