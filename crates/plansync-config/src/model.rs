//! Typed settings document.
//!
//! # Design
//! - Every key is optional on read; missing keys take defaults.
//! - A stored route snapshot that does not match the current shape is treated
//!   as absent, so the next run records a fresh one.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use plansync_core::defaults;
use plansync_core::{Endpoints, FlightMetadata, FormatId, RetentionPolicy, SyncRequest};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Persisted user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Planning service user identifier.
    pub username: String,
    /// Enabled output formats.
    pub formats: BTreeSet<FormatId>,
    /// Target directory per format.
    pub directories: BTreeMap<FormatId, String>,
    /// Age in days after which `clean` deletes artifacts.
    pub retention_days: u64,
    /// Metadata fetcher endpoint.
    pub metadata_url: String,
    /// Prefix of artifact download URLs.
    pub artifact_base_url: String,
    /// HTTP timeout applied to every request.
    pub http_timeout_secs: u64,
    /// Route snapshot recorded by the last run that saw a new route.
    #[serde(
        deserialize_with = "lenient_snapshot",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_flight_info: Option<FlightMetadata>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: String::new(),
            formats: BTreeSet::new(),
            directories: BTreeMap::new(),
            retention_days: defaults::RETENTION_DAYS,
            metadata_url: defaults::METADATA_URL.to_string(),
            artifact_base_url: defaults::ARTIFACT_BASE_URL.to_string(),
            http_timeout_secs: defaults::HTTP_TIMEOUT_SECS,
            last_flight_info: None,
        }
    }
}

impl Settings {
    /// Remote endpoints for the synchronisation engine.
    #[must_use]
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            metadata_url: self.metadata_url.clone(),
            artifact_base_url: self.artifact_base_url.clone(),
        }
    }

    /// HTTP timeout as a [`Duration`].
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Synchronisation request built from the stored selection.
    #[must_use]
    pub fn sync_request(&self) -> SyncRequest {
        SyncRequest {
            user_id: self.username.trim().to_string(),
            formats: self.formats.clone(),
            directories: self.directories.clone(),
        }
    }

    /// Retention policy covering every configured directory, enabled or not.
    #[must_use]
    pub fn retention_policy(&self, days: u64) -> RetentionPolicy {
        RetentionPolicy::days(
            days,
            self.directories
                .values()
                .map(|dir| dir.trim())
                .filter(|dir| !dir.is_empty()),
        )
    }
}

fn lenient_snapshot<'de, D>(deserializer: D) -> Result<Option<FlightMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}
