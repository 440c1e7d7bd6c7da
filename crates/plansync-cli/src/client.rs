//! Shared HTTP client, settings context, and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use plansync_config::{ConfigError, FileSettingsStore, Settings, default_settings_path};
use plansync_core::SyncError;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const USER_AGENT: &str = concat!("plansync/", env!("CARGO_PKG_VERSION"));

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match &err {
            ConfigError::InvalidField { .. } => Self::validation(err.detail()),
            ConfigError::Json { .. } | ConfigError::Io { .. } | ConfigError::HomeDirUnavailable => {
                Self::failure(anyhow!(err.detail()))
            }
        }
    }
}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        match &err {
            SyncError::InvalidRequest { .. }
            | SyncError::NoFormatsEnabled
            | SyncError::MissingDirectory { .. } => Self::validation(err.reason()),
            _ => Self::failure(anyhow!(err.reason())),
        }
    }
}

/// Dependencies resolved before a command runs.
#[derive(Debug)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) store: FileSettingsStore,
    pub(crate) settings: Settings,
}

impl AppContext {
    /// Open the settings file and build an HTTP client tagged with `trace_id`.
    pub(crate) async fn load(
        config: Option<PathBuf>,
        timeout_secs: Option<u64>,
        trace_id: &str,
    ) -> CliResult<Self> {
        let path = match config {
            Some(path) => path,
            None => default_settings_path()?,
        };
        debug!(path = %path.display(), "loading settings");
        let store = FileSettingsStore::new(path);
        let settings = store.load().await?;
        let timeout = timeout_secs.map_or_else(|| settings.http_timeout(), Duration::from_secs);

        Ok(Self {
            client: build_client(timeout, trace_id)?,
            store,
            settings,
        })
    }
}

/// HTTP client shared by the metadata and artifact requests of one command.
pub(crate) fn build_client(timeout: Duration, trace_id: &str) -> CliResult<Client> {
    let mut default_headers = HeaderMap::new();
    let request_id = HeaderValue::from_str(trace_id)
        .map_err(|_| CliError::failure(anyhow!("trace identifier contains invalid characters")))?;
    default_headers.insert(HEADER_REQUEST_ID, request_id);

    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .default_headers(default_headers)
        .build()
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::prelude::*;
    use plansync_core::FormatId;
    use plansync_test_support::fs::{temp_dir, write_file};

    #[test]
    fn exit_codes_distinguish_validation_from_failure() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow!("boom")).exit_code(), 3);
        assert_eq!(CliError::validation("bad").display_message(), "bad");
    }

    #[test]
    fn sync_errors_map_to_exit_classes() {
        let missing = CliError::from(SyncError::MissingDirectory {
            format: FormatId::Pdf,
        });
        assert_eq!(missing.exit_code(), 2);
        assert!(missing.display_message().contains("PDF"));

        let incomplete = CliError::from(SyncError::IncompleteData {
            section: "aircraft",
            field: None,
        });
        assert_eq!(incomplete.exit_code(), 3);
        assert!(incomplete.display_message().contains("aircraft"));
    }

    #[tokio::test]
    async fn context_reads_settings_file() -> Result<()> {
        let dir = temp_dir()?;
        let path = write_file(
            dir.path(),
            "settings.json",
            br#"{"username": "123456", "http_timeout_secs": 5}"#,
        )?;

        let ctx = AppContext::load(Some(path.clone()), None, "trace")
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(ctx.settings.username, "123456");
        assert_eq!(ctx.store.path(), path.as_path());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_settings_are_operational_failures() -> Result<()> {
        let dir = temp_dir()?;
        let path = write_file(dir.path(), "settings.json", b"{")?;
        let err = AppContext::load(Some(path), None, "trace")
            .await
            .expect_err("settings are malformed");
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("settings.json"));
        Ok(())
    }

    #[tokio::test]
    async fn client_sends_request_id_and_user_agent() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/ping")
                .header(HEADER_REQUEST_ID, "trace-123")
                .header("user-agent", USER_AGENT);
            then.status(204);
        });

        let client = build_client(Duration::from_secs(5), "trace-123")
            .map_err(|err| anyhow!(err.display_message()))?;
        client.get(server.url("/ping")).send().await?;

        mock.assert();
        Ok(())
    }

    #[test]
    fn invalid_trace_id_is_rejected() {
        let err = build_client(Duration::from_secs(1), "bad\nid").expect_err("newline");
        assert_eq!(err.exit_code(), 3);
    }
}
