//! Error types for relief console operations.
//!
//! [`ReliefError`] covers the local concerns of the console: configuration,
//! and file system access for logs and config. Backend failures live
//! in `relief-api` and never reach the operator through this type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ReliefError`].
pub type Result<T> = std::result::Result<T, ReliefError>;

/// Error type for local console operations.
#[derive(Debug, Error)]
pub enum ReliefError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file not found
    #[error("Configuration not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Environment override could not be parsed
    #[error("Invalid value for {var}: {value}")]
    EnvOverride { var: String, value: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (bug in the console)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ReliefError {
    /// Create a ConfigNotFound error with source
    pub fn config_not_found_with_source(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: Some(source),
        }
    }

    /// Create a ConfigValidation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigInvalid { .. }
                | Self::ConfigValidation { .. }
                | Self::EnvOverride { .. }
        )
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound { .. } => {
                Some("Create ~/.relief/config.yaml or pass --api-base on the command line")
            }
            Self::ConfigInvalid { .. } => Some("Check YAML syntax in ~/.relief/config.yaml"),
            Self::ConfigValidation { .. } => {
                Some("api_base_url must be an http(s) URL and poll intervals must be positive")
            }
            Self::EnvOverride { .. } => Some("Unset the variable or give it a valid value"),
            _ => None,
        }
    }
}
