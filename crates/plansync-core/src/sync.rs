//! Single synchronisation run.
//!
//! # Design
//! - One metadata fetch, then one download per enabled format in
//!   [`FormatId::ALL`] order. Nothing runs in parallel, so a later format's
//!   allocation sees files written earlier in the same run.
//! - Metadata failures abort the run before any download; per-format failures
//!   are recorded and the run moves on.
//! - Collaborators (settings persistence, log/progress rendering) are injected.

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use crate::allocate::next_filename;
use crate::defaults;
use crate::download::ArtifactDownloader;
use crate::error::{SyncError, SyncResult};
use crate::formats::{ArtifactLocator, FormatId};
use crate::metadata::MetadataClient;
use crate::model::{
    DownloadTarget, FlightMetadata, FormatFailure, SavedArtifact, SyncOutcome, SyncReport,
};
use crate::route::is_new_route;

/// Error type returned by settings store implementations.
pub type StoreError = Box<dyn Error + Send + Sync>;

/// Persistence for the last recorded route snapshot.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the snapshot recorded by the previous run, if any.
    async fn load_last_flight_info(&self) -> Result<Option<FlightMetadata>, StoreError>;

    /// Record `metadata` as the latest route.
    async fn save_last_flight_info(&self, metadata: &FlightMetadata) -> Result<(), StoreError>;
}

/// Receives log lines and progress fractions for presentation.
pub trait ProgressSink: Send {
    /// Emit one human-readable log line.
    fn log(&mut self, line: &str);

    /// Report download progress in `[0, 1]`.
    fn progress(&mut self, fraction: f64);
}

/// Remote endpoints used by a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    /// Metadata fetcher URL.
    pub metadata_url: String,
    /// Prefix of the artifact download URLs.
    pub artifact_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            metadata_url: defaults::METADATA_URL.to_string(),
            artifact_base_url: defaults::ARTIFACT_BASE_URL.to_string(),
        }
    }
}

/// Inputs for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncRequest {
    /// Planning service user identifier.
    pub user_id: String,
    /// Formats to download.
    pub formats: BTreeSet<FormatId>,
    /// Target directory per format.
    pub directories: BTreeMap<FormatId, String>,
}

impl SyncRequest {
    fn validate(&self) -> SyncResult<()> {
        if self.user_id.trim().is_empty() {
            return Err(SyncError::invalid("user_id", "must not be empty", None));
        }
        if self.formats.is_empty() {
            return Err(SyncError::NoFormatsEnabled);
        }
        Ok(())
    }

    fn directory(&self, format: FormatId) -> SyncResult<&Path> {
        self.directories
            .get(&format)
            .map(|dir| dir.trim())
            .filter(|dir| !dir.is_empty())
            .map(Path::new)
            .ok_or(SyncError::MissingDirectory { format })
    }
}

/// Synchronisation engine wiring the metadata client, locator, and downloader.
#[derive(Clone, Debug)]
pub struct FlightplanSync {
    metadata: MetadataClient,
    locator: ArtifactLocator,
    downloader: ArtifactDownloader,
}

impl FlightplanSync {
    /// Build an engine sharing `client` across metadata and artifact requests.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidRequest`] when an endpoint is not an absolute URL.
    pub fn new(client: Client, endpoints: &Endpoints) -> SyncResult<Self> {
        Ok(Self {
            metadata: MetadataClient::new(client.clone(), &endpoints.metadata_url)?,
            locator: ArtifactLocator::new(&endpoints.artifact_base_url)?,
            downloader: ArtifactDownloader::new(client),
        })
    }

    /// Execute one run.
    ///
    /// # Errors
    ///
    /// Returns an error when the request is invalid or the metadata fetch fails.
    /// Download failures are reported inside the returned [`SyncReport`].
    pub async fn run(
        &self,
        request: &SyncRequest,
        store: &dyn SettingsStore,
        sink: &mut dyn ProgressSink,
    ) -> SyncResult<SyncReport> {
        request.validate()?;

        sink.log(&format!(
            "Fetching flight plan data for user {}",
            request.user_id.trim()
        ));
        let metadata = self.metadata.fetch(&request.user_id).await?;

        let previous = match store.load_last_flight_info().await {
            Ok(previous) => previous,
            Err(err) => {
                warn!(error = %err, "failed to load last flight info");
                None
            }
        };
        let new_route = is_new_route(&metadata, previous.as_ref());
        sink.log(&metadata.summary());

        if new_route {
            sink.log("New route detected!");
            if let Err(err) = store.save_last_flight_info(&metadata).await {
                warn!(error = %err, "failed to record last flight info");
                sink.log(&format!("Failed to record last flight info: {err}"));
            }
        } else {
            sink.log("No new route detected.");
        }
        info!(route = %metadata.base_name(), new_route, "flight plan metadata fetched");

        let mut report = SyncReport {
            metadata,
            new_route,
            saved: Vec::new(),
            failed: Vec::new(),
        };

        for format in FormatId::ALL
            .into_iter()
            .filter(|format| request.formats.contains(format))
        {
            match self
                .sync_format(format, &report.metadata, request, sink)
                .await
            {
                Ok(saved) => report.saved.push(saved),
                Err(err) => {
                    let reason = err.reason();
                    warn!(%format, reason = %reason, "format download failed");
                    sink.log(&format!("Failed to download {format}: {reason}"));
                    report.failed.push(FormatFailure { format, reason });
                }
            }
        }

        match report.outcome() {
            SyncOutcome::Complete | SyncOutcome::Partial => {
                sink.log("Selected flight plan files have been downloaded.");
            }
            SyncOutcome::NoneSucceeded => {
                sink.log("No files were downloaded. Check your selection and flight plan.");
            }
        }
        Ok(report)
    }

    /// Resolve the download target for one format without touching the network.
    ///
    /// # Errors
    ///
    /// - [`SyncError::MissingDirectory`] when no directory is configured.
    /// - [`SyncError::DirectoryUnreadable`] when the directory cannot be listed.
    pub fn prepare_target(
        &self,
        format: FormatId,
        metadata: &FlightMetadata,
        request: &SyncRequest,
    ) -> SyncResult<DownloadTarget> {
        let directory = request.directory(format)?;
        let location = self.locator.locate(format.spec(), metadata);
        let allocated_filename =
            next_filename(directory, &location.base_name, location.extension)?;
        Ok(DownloadTarget {
            format,
            target_directory: directory.to_path_buf(),
            source_url: location.url,
            allocated_filename,
        })
    }

    async fn sync_format(
        &self,
        format: FormatId,
        metadata: &FlightMetadata,
        request: &SyncRequest,
        sink: &mut dyn ProgressSink,
    ) -> SyncResult<SavedArtifact> {
        let target = self.prepare_target(format, metadata, request)?;
        sink.log(&format!(
            "Downloading {format} to {}",
            target.destination().display()
        ));
        sink.progress(0.0);

        let artifact = self
            .downloader
            .download(
                &target.source_url,
                &target.target_directory,
                &target.allocated_filename,
                |fraction| sink.progress(fraction),
            )
            .await?;

        sink.log(&format!("Saved: {}", target.allocated_filename));
        Ok(SavedArtifact {
            format,
            path: artifact.path,
            bytes: artifact.bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::parse_metadata;
    use anyhow::Result;
    use plansync_test_support::fixtures::sample_ofp;

    fn engine() -> SyncResult<FlightplanSync> {
        FlightplanSync::new(Client::new(), &Endpoints::default())
    }

    #[test]
    fn request_requires_user_and_formats() {
        let mut request = SyncRequest::default();
        assert!(matches!(
            request.validate(),
            Err(SyncError::InvalidRequest {
                field: "user_id",
                ..
            })
        ));

        request.user_id = "123456".into();
        assert!(matches!(
            request.validate(),
            Err(SyncError::NoFormatsEnabled)
        ));

        request.formats.insert(FormatId::Pdf);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn blank_directory_is_missing() {
        let request = SyncRequest {
            user_id: "123456".into(),
            formats: BTreeSet::from([FormatId::Tds]),
            directories: BTreeMap::from([(FormatId::Tds, "   ".to_string())]),
        };
        assert!(matches!(
            request.directory(FormatId::Tds),
            Err(SyncError::MissingDirectory {
                format: FormatId::Tds
            })
        ));
        assert!(matches!(
            request.directory(FormatId::Pdf),
            Err(SyncError::MissingDirectory {
                format: FormatId::Pdf
            })
        ));
    }

    #[test]
    fn prepare_target_allocates_in_configured_directory() -> Result<()> {
        let dir = plansync_test_support::fs::temp_dir()?;
        plansync_test_support::fs::write_file(dir.path(), "KJFKKLAX01.fms", b"")?;
        let dir_string = dir.path().display().to_string();
        let request = SyncRequest {
            user_id: "123456".into(),
            formats: BTreeSet::from([FormatId::Xpe]),
            directories: BTreeMap::from([(FormatId::Xpe, dir_string)]),
        };

        let metadata = parse_metadata(&sample_ofp())?;
        let target = engine()?.prepare_target(FormatId::Xpe, &metadata, &request)?;

        assert_eq!(target.allocated_filename, "KJFKKLAX02.fms");
        assert_eq!(target.target_directory, dir.path());
        assert!(target.source_url.ends_with("KJFKKLAX_XPE_1718035200.fms"));
        Ok(())
    }
}
