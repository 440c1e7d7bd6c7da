//! Error types for settings operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for settings operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// Settings document could not be parsed or rendered.
    #[error("settings document is not valid JSON")]
    Json {
        /// Operation identifier.
        operation: &'static str,
        /// Settings file path.
        path: PathBuf,
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// No home directory is available to derive the default settings path.
    #[error("home directory is unavailable")]
    HomeDirUnavailable,
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, value: Option<String>, reason: &'static str) -> Self {
        Self::InvalidField {
            field,
            value,
            reason,
        }
    }

    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: serde_json::Error,
    ) -> Self {
        Self::Json {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Human-readable description including context fields.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidField {
                field,
                value: Some(value),
                reason,
            } => format!("{self}: {field} {reason} (got '{value}')"),
            Self::InvalidField {
                field,
                value: None,
                reason,
            } => format!("{self}: {field} {reason}"),
            Self::Json { path, source, .. } => {
                format!("{self}: {}: {source}", path.display())
            }
            Self::Io {
                operation,
                path,
                source,
            } => format!("{self}: {operation} {}: {source}", path.display()),
            Self::HomeDirUnavailable => self.to_string(),
        }
    }
}

/// Convenience alias for settings results.
pub type ConfigResult<T> = Result<T, ConfigError>;
