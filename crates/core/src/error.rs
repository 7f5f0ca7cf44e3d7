//! Error types for the rotating imager.

use thiserror::Error;

/// Result type alias using the rotating imager's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the rotating imager.
///
/// The rotation core itself never fails; these errors come from the
/// collaborators (listing, creating, deleting) and from configuration.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("Listing failed: {0}")]
    Listing(String),

    #[error("Cloud API error: {0}")]
    Cloud(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration source error: {0}")]
    Config(#[from] config::ConfigError),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a listing error.
    pub fn listing(msg: impl Into<String>) -> Self {
        Self::Listing(msg.into())
    }

    /// Create a cloud API error.
    pub fn cloud(msg: impl Into<String>) -> Self {
        Self::Cloud(msg.into())
    }

    /// Create an image not found error.
    pub fn image_not_found(id: impl Into<String>) -> Self {
        Self::ImageNotFound(id.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
