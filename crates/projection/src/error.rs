//! Error types for projections.

use thiserror::Error;

/// Errors raised while building or applying a projection.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// The CRS has no projection implementation.
    #[error("unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// A coordinate could not be transformed.
    #[error("cannot transform ({x}, {y}) from {from} to {to}")]
    OutOfDomain {
        x: f64,
        y: f64,
        from: String,
        to: String,
    },
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
