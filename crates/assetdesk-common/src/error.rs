//! Error types for assetdesk

use thiserror::Error;

/// Result type alias for assetdesk operations
pub type Result<T> = std::result::Result<T, AssetdeskError>;

/// Main error type for assetdesk
#[derive(Error, Debug)]
pub enum AssetdeskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A value outside one of the closed vocabularies in [`crate::types`]
    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AssetdeskError {
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}
