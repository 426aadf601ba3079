//! Error types for the fallible helpers.

use thiserror::Error;

/// Result type for utility operations.
pub type Result<T> = std::result::Result<T, UtilsError>;

/// Errors returned by the config, conversion, datetime, logger and database helpers.
#[derive(Debug, Error)]
pub enum UtilsError {
    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The file format cannot be loaded.
    #[error("{0}")]
    UnsupportedFormat(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A string could not be converted to the requested type.
    #[error("Cannot convert {input:?} to {target}: {reason}")]
    ConversionError {
        /// The rejected input.
        input: String,
        /// Name of the requested type.
        target: &'static str,
        /// Why the conversion failed.
        reason: String,
    },

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Logger setup error.
    #[error("Logger error: {0}")]
    LoggerError(String),

    /// Database driver error.
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Database used before `connect`.
    #[error("Database is not connected: {0}")]
    NotConnected(String),
}

impl UtilsError {
    pub(crate) fn conversion(
        input: &str,
        target: &'static str,
        reason: impl std::fmt::Display,
    ) -> Self {
        UtilsError::ConversionError {
            input: input.to_string(),
            target,
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for UtilsError {
    fn from(err: serde_json::Error) -> Self {
        UtilsError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for UtilsError {
    fn from(err: serde_yaml::Error) -> Self {
        UtilsError::SerializationError(err.to_string())
    }
}
