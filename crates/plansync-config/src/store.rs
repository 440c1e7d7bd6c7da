//! JSON settings file.
//!
//! # Design
//! - A missing file reads as [`Settings::default`].
//! - Writes go to a sibling temp file which is renamed over the target, so a
//!   crash never leaves a truncated document behind.
//! - Read-modify-write updates are serialised through an async mutex.

use std::env;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use plansync_core::{FlightMetadata, SettingsStore, StoreError};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::model::Settings;

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV: &str = "PLANSYNC_CONFIG";

const SETTINGS_DIR: &str = ".plansync";
const SETTINGS_FILE: &str = "settings.json";

/// Default settings path: `$PLANSYNC_CONFIG`, else `~/.plansync/settings.json`.
///
/// # Errors
///
/// Returns [`ConfigError::HomeDirUnavailable`] when neither the override nor a
/// home directory is available.
pub fn default_settings_path() -> ConfigResult<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|path| !path.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(SETTINGS_DIR).join(SETTINGS_FILE))
        .ok_or(ConfigError::HomeDirUnavailable)
}

/// Settings persisted as a single JSON document.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    update: Mutex<()>,
}

impl FileSettingsStore {
    /// Store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            update: Mutex::new(()),
        }
    }

    /// Location of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings document.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Io`] when the file exists but cannot be read.
    /// - [`ConfigError::Json`] when the document is not valid JSON.
    pub async fn load(&self) -> ConfigResult<Settings> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "settings file absent; using defaults");
                return Ok(Settings::default());
            }
            Err(err) => return Err(ConfigError::io("read_settings", &self.path, err)),
        };
        serde_json::from_slice(&raw)
            .map_err(|err| ConfigError::json("parse_settings", &self.path, err))
    }

    /// Replace the settings document.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Json`] when the settings cannot be rendered.
    /// - [`ConfigError::Io`] when the directory or file cannot be written.
    pub async fn save(&self, settings: &Settings) -> ConfigResult<()> {
        let rendered = serde_json::to_vec_pretty(settings)
            .map_err(|err| ConfigError::json("render_settings", &self.path, err))?;

        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| ConfigError::io("create_settings_dir", parent, err))?;
        }

        let staging = self.staging_path();
        fs::write(&staging, rendered)
            .await
            .map_err(|err| ConfigError::io("write_settings", &staging, err))?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(|err| ConfigError::io("replace_settings", &self.path, err))?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// Load, apply `change`, and save while holding the update lock.
    ///
    /// Nothing is written when `change` fails.
    ///
    /// # Errors
    ///
    /// Propagates load, change, and save failures.
    pub async fn update<F>(&self, change: F) -> ConfigResult<Settings>
    where
        F: FnOnce(&mut Settings) -> ConfigResult<()> + Send,
    {
        let _guard = self.update.lock().await;
        let mut settings = self.load().await?;
        change(&mut settings)?;
        self.save(&settings).await?;
        Ok(settings)
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| SETTINGS_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load_last_flight_info(&self) -> Result<Option<FlightMetadata>, StoreError> {
        let settings = self.load().await.map_err(|err| err.detail())?;
        Ok(settings.last_flight_info)
    }

    async fn save_last_flight_info(&self, metadata: &FlightMetadata) -> Result<(), StoreError> {
        let snapshot = metadata.clone();
        self.update(move |settings| {
            settings.last_flight_info = Some(snapshot);
            Ok(())
        })
        .await
        .map_err(|err| err.detail())?;
        info!(route = %metadata.base_name(), "recorded last flight info");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use plansync_core::FormatId;
    use plansync_test_support::fs::{temp_dir, write_file};

    #[tokio::test]
    async fn missing_file_loads_defaults() -> Result<()> {
        let dir = temp_dir()?;
        let store = FileSettingsStore::new(dir.path().join("settings.json"));
        assert_eq!(store.load().await?, Settings::default());
        Ok(())
    }

    #[tokio::test]
    async fn save_creates_parent_and_leaves_no_staging_file() -> Result<()> {
        let dir = temp_dir()?;
        let path = dir.path().join(".plansync").join("settings.json");
        let store = FileSettingsStore::new(&path);
        let settings = Settings {
            username: "123456".into(),
            formats: [FormatId::Pdf].into(),
            ..Settings::default()
        };

        store.save(&settings).await?;

        assert!(path.exists());
        assert!(!store.staging_path().exists());
        assert_eq!(store.load().await?, settings);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_json_is_reported_with_path() -> Result<()> {
        let dir = temp_dir()?;
        let path = write_file(dir.path(), "settings.json", b"{ not json")?;
        let err = FileSettingsStore::new(&path)
            .load()
            .await
            .expect_err("document is malformed");
        assert!(matches!(
            err,
            ConfigError::Json {
                operation: "parse_settings",
                ..
            }
        ));
        assert!(err.detail().contains("settings.json"));
        Ok(())
    }

    #[tokio::test]
    async fn update_preserves_other_keys() -> Result<()> {
        let dir = temp_dir()?;
        let store = FileSettingsStore::new(dir.path().join("settings.json"));
        store
            .update(|settings| {
                settings.username = "123456".into();
                Ok(())
            })
            .await?;
        let updated = store
            .update(|settings| {
                settings.retention_days = 3;
                Ok(())
            })
            .await?;

        assert_eq!(updated.username, "123456");
        assert_eq!(store.load().await?.retention_days, 3);
        Ok(())
    }

    #[tokio::test]
    async fn failed_change_leaves_file_untouched() -> Result<()> {
        let dir = temp_dir()?;
        let store = FileSettingsStore::new(dir.path().join("settings.json"));
        let err = store
            .update(|settings| {
                settings.retention_days = 0;
                crate::validate_settings(settings)
            })
            .await
            .expect_err("validation rejects zero retention");

        assert!(matches!(err, ConfigError::InvalidField { .. }));
        assert!(!store.path().exists());
        Ok(())
    }
}
