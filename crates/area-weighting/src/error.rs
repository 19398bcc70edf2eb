//! Error types for aggregation.

use chrono::{DateTime, Utc};
use projection::ProjectionError;
use serde::Serialize;
use thiserror::Error;

/// Errors that abort an aggregation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    /// Inputs cannot be brought into a common planar CRS.
    #[error("CRS mismatch: {0}")]
    CrsMismatch(String),

    /// The target grid, the source batch or the attribute list is empty.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Two target cells share a code.
    #[error("duplicate cell code in target grid: {0}")]
    DuplicateCode(String),

    /// Tiling an extent at this size would need more tiles than allowed.
    #[error("tile size {size} needs {count} tiles, more than the limit of {max}")]
    TooManyTiles { size: f64, count: f64, max: usize },
}

impl AggregationError {
    pub fn crs_mismatch(msg: impl Into<String>) -> Self {
        Self::CrsMismatch(msg.into())
    }

    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }
}

impl From<ProjectionError> for AggregationError {
    fn from(err: ProjectionError) -> Self {
        Self::CrsMismatch(err.to_string())
    }
}

/// Result type for aggregation.
pub type Result<T> = std::result::Result<T, AggregationError>;

/// Non-fatal data-quality flag: the overlap weights of a cell sum past
/// `1 + epsilon`, meaning source features overlap each other. Values are
/// still normalised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightOverflowWarning {
    pub code: String,
    pub timestamp: DateTime<Utc>,
    /// Sum of weights over every intersection record of the cell.
    pub weight: f64,
}

impl std::fmt::Display for WeightOverflowWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cell {} at {}: total overlap weight {:.6} exceeds 1",
            self.code,
            self.timestamp.to_rfc3339(),
            self.weight
        )
    }
}
