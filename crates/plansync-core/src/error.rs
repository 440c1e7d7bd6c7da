//! # Design
//!
//! - Provide structured, constant-message errors for the synchronisation pipeline.
//! - Capture operation context (urls, paths, sections) to make failures reproducible in tests.
//! - Preserve source errors; `reason` renders the context for log lines and reports.

use std::error::Error as _;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::formats::FormatId;

/// Result type for synchronisation operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors produced by the synchronisation engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport-level failure while talking to the remote service.
    #[error("network request failed")]
    Network {
        /// Operation that issued the request.
        operation: &'static str,
        /// URL that was requested.
        url: String,
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },
    /// The remote service answered with a non-success status.
    #[error("remote service reported a failure status")]
    Service {
        /// Operation that issued the request.
        operation: &'static str,
        /// URL that was requested.
        url: String,
        /// HTTP status code returned by the service.
        status: u16,
    },
    /// The remote service answered with a body that is not valid JSON.
    #[error("remote service returned a malformed response")]
    MalformedResponse {
        /// Operation that issued the request.
        operation: &'static str,
        /// URL that was requested.
        url: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The response was well-formed but lacked required metadata.
    #[error("flight plan metadata is incomplete")]
    IncompleteData {
        /// Top-level section that was missing or empty.
        section: &'static str,
        /// Field inside the section when the section itself was present.
        field: Option<&'static str>,
    },
    /// A metadata field held a value that cannot be used locally.
    #[error("flight plan metadata contains an invalid value")]
    InvalidData {
        /// Top-level section holding the field.
        section: &'static str,
        /// Offending field.
        field: &'static str,
        /// Value received from the service.
        value: String,
    },
    /// A local directory could not be listed.
    #[error("directory could not be read")]
    DirectoryUnreadable {
        /// Operation that listed the directory.
        operation: &'static str,
        /// Directory path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A local file or directory could not be created or written.
    #[error("filesystem operation failed")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// No target directory is configured for an enabled format.
    #[error("no target directory configured")]
    MissingDirectory {
        /// Format lacking a directory.
        format: FormatId,
    },
    /// Caller-supplied input failed validation.
    #[error("invalid request")]
    InvalidRequest {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// The run was started without any enabled format.
    #[error("no formats enabled")]
    NoFormatsEnabled,
}

impl SyncError {
    pub(crate) fn network(
        operation: &'static str,
        url: impl Into<String>,
        source: reqwest::Error,
    ) -> Self {
        Self::Network {
            operation,
            url: url.into(),
            source,
        }
    }

    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn directory_unreadable(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self::DirectoryUnreadable {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) const fn incomplete(section: &'static str, field: Option<&'static str>) -> Self {
        Self::IncompleteData { section, field }
    }

    pub(crate) fn invalid_data(
        section: &'static str,
        field: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidData {
            section,
            field,
            value: value.into(),
        }
    }

    pub(crate) const fn invalid(
        field: &'static str,
        reason: &'static str,
        value: Option<String>,
    ) -> Self {
        Self::InvalidRequest {
            field,
            reason,
            value,
        }
    }

    /// Human-readable description including context fields and the source chain.
    #[must_use]
    pub fn reason(&self) -> String {
        let context = match self {
            Self::Network { url, .. } | Self::MalformedResponse { url, .. } => url.clone(),
            Self::Service { url, status, .. } => format!("status {status} from {url}"),
            Self::IncompleteData { section, field } => field.map_or_else(
                || format!("missing section '{section}'"),
                |field| format!("missing field '{section}.{field}'"),
            ),
            Self::InvalidData {
                section,
                field,
                value,
            } => format!("'{section}.{field}' is '{value}'"),
            Self::DirectoryUnreadable { path, .. } | Self::Io { path, .. } => {
                path.display().to_string()
            }
            Self::MissingDirectory { format } => format.to_string(),
            Self::InvalidRequest {
                field,
                reason,
                value,
            } => value.as_ref().map_or_else(
                || format!("{field} {reason}"),
                |value| format!("{field} {reason} (got '{value}')"),
            ),
            Self::NoFormatsEnabled => String::from("enable at least one format"),
        };

        let mut rendered = format!("{self} ({context})");
        let mut source = self.source();
        while let Some(err) = source {
            rendered.push_str(": ");
            rendered.push_str(&err.to_string());
            source = err.source();
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_helpers_preserve_sources() {
        let err = SyncError::io("write_file", "/tmp/plan.pdf", io::Error::other("disk full"));
        assert!(matches!(err, SyncError::Io { .. }));
        assert!(err.source().is_some());

        let err = SyncError::directory_unreadable("list_directory", "/nope", io::Error::other("x"));
        assert!(matches!(err, SyncError::DirectoryUnreadable { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn reason_renders_context_and_source_chain() {
        let err = SyncError::io("write_file", "/tmp/plan.pdf", io::Error::other("disk full"));
        let reason = err.reason();
        assert!(reason.starts_with("filesystem operation failed"));
        assert!(reason.contains("/tmp/plan.pdf"));
        assert!(reason.ends_with("disk full"));
    }

    #[test]
    fn reason_names_missing_sections_and_fields() {
        assert!(
            SyncError::incomplete("aircraft", None)
                .reason()
                .contains("missing section 'aircraft'")
        );
        assert!(
            SyncError::incomplete("origin", Some("icao_code"))
                .reason()
                .contains("missing field 'origin.icao_code'")
        );
    }

    #[test]
    fn invalid_data_reason_names_field_and_value() {
        let err = SyncError::invalid_data("origin", "icao_code", "../x");
        assert_eq!(
            err.reason(),
            "flight plan metadata contains an invalid value ('origin.icao_code' is '../x')"
        );
    }

    #[test]
    fn service_reason_includes_status() {
        let err = SyncError::Service {
            operation: "fetch_metadata",
            url: "http://localhost/api".into(),
            status: 503,
        };
        assert!(err.reason().contains("status 503"));
    }

    #[test]
    fn invalid_request_reason_includes_value() {
        let err = SyncError::invalid("user_id", "must not be empty", Some("  ".into()));
        assert_eq!(
            err.reason(),
            "invalid request (user_id must not be empty (got '  '))"
        );
    }
}
