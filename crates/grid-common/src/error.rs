//! Error types for the shared geometry/table layer.

use thiserror::Error;

/// Result type alias using GridCommonError.
pub type Result<T> = std::result::Result<T, GridCommonError>;

/// Errors raised while decoding or encoding geometry+attribute tables.
#[derive(Debug, Error)]
pub enum GridCommonError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Unsupported geometry type '{found}', expected {expected}")]
    UnsupportedGeometry { found: String, expected: String },

    #[error("Missing property '{property}' on feature {index}")]
    MissingProperty { property: String, index: usize },

    #[error("Invalid value for property '{property}' on feature {index}: {message}")]
    InvalidProperty {
        property: String,
        index: usize,
        message: String,
    },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GridCommonError {
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    pub fn missing_property(property: impl Into<String>, index: usize) -> Self {
        Self::MissingProperty {
            property: property.into(),
            index,
        }
    }

    pub fn invalid_property(
        property: impl Into<String>,
        index: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidProperty {
            property: property.into(),
            index,
            message: message.into(),
        }
    }
}
