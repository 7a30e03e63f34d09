//! Error types for ChemFCD

use thiserror::Error;

/// Main error type for ChemFCD operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Statistics error: {0}")]
    Stats(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    /// Two collaborating tensors disagree on their dimensions. Raised before
    /// any numerical work is attempted.
    #[error("Shape mismatch for {what}: {left:?} vs {right:?}")]
    ShapeMismatch {
        what: &'static str,
        left: Vec<usize>,
        right: Vec<usize>,
    },

    /// The stabilized matrix square root kept a non-negligible imaginary
    /// component. This usually means the statistics were estimated from too
    /// few samples and must not be silently discarded.
    #[error("Matrix square root has imaginary component {magnitude:e}")]
    ComplexResidual { magnitude: f64 },

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for ChemFCD operations
pub type Result<T> = std::result::Result<T, Error>;
