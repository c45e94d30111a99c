//! Error types for orrery_scene

use thiserror::Error;

/// Errors raised while loading or validating scene configuration
#[derive(Error, Debug)]
pub enum SceneError {
    /// Failed to read a configuration file
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is not valid TOML or has the wrong shape
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize configuration
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range
    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

impl SceneError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SceneError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for orrery_scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
