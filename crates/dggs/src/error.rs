//! Error types for grid generation.

use thiserror::Error;

/// Errors that can occur while generating a grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DggsError {
    /// The NW/SE corners do not span a valid rectangle.
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    /// The subdivision level is negative or beyond the supported depth.
    #[error("unsupported level {level}: expected 0..={max}")]
    UnsupportedLevel { level: i64, max: u8 },

    /// A cell code that is not a valid rHEALPix address.
    #[error("invalid cell address: {0}")]
    InvalidAddress(String),
}

impl DggsError {
    pub fn invalid_region(msg: impl Into<String>) -> Self {
        Self::InvalidRegion(msg.into())
    }
}

/// Result type for grid generation.
pub type Result<T> = std::result::Result<T, DggsError>;
