//! Streaming artifact downloader.
//!
//! The body is written to disk in fixed-size chunks as it arrives. Progress is
//! reported after every chunk when the server advertised a length, and always
//! once with `1.0` on completion. A failed download leaves any partial file in
//! place.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{SyncError, SyncResult};

const OPERATION: &str = "download_artifact";

/// Write granularity for downloaded bodies.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// File written by a completed download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadedArtifact {
    /// Destination path.
    pub path: PathBuf,
    /// Number of bytes written.
    pub bytes: u64,
}

/// Downloads artifacts over the shared HTTP client.
#[derive(Clone, Debug)]
pub struct ArtifactDownloader {
    client: Client,
}

impl ArtifactDownloader {
    /// Create a downloader backed by `client`.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Stream `url` into `directory/filename`, reporting progress fractions.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Network`] on transport failure or a non-success status.
    /// - [`SyncError::Io`] when the directory or file cannot be created or written.
    pub async fn download<F>(
        &self,
        url: &str,
        directory: &Path,
        filename: &str,
        mut on_progress: F,
    ) -> SyncResult<DownloadedArtifact>
    where
        F: FnMut(f64),
    {
        fs::create_dir_all(directory)
            .await
            .map_err(|source| SyncError::io("create_directory", directory, source))?;
        let path = directory.join(filename);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| SyncError::network(OPERATION, url, source))?;
        let total = response.content_length();
        debug!(url, total_bytes = ?total, "download started");

        let mut file = fs::File::create(&path)
            .await
            .map_err(|source| SyncError::io("create_file", &path, source))?;
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| SyncError::network(OPERATION, url, source))?;
            for piece in chunk.chunks(CHUNK_SIZE) {
                file.write_all(piece)
                    .await
                    .map_err(|source| SyncError::io("write_file", &path, source))?;
                written = written.saturating_add(piece.len() as u64);
                if let Some(fraction) = progress_fraction(written, total) {
                    on_progress(fraction);
                }
            }
        }

        file.flush()
            .await
            .map_err(|source| SyncError::io("flush_file", &path, source))?;
        on_progress(1.0);
        info!(path = %path.display(), bytes = written, "artifact saved");

        Ok(DownloadedArtifact {
            path,
            bytes: written,
        })
    }
}

/// Fraction of `total` covered by `written`, clamped to `[0, 1]`.
///
/// Returns `None` when the total is unknown or zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn progress_fraction(written: u64, total: Option<u64>) -> Option<f64> {
    let total = total.filter(|total| *total > 0)?;
    Some((written as f64 / total as f64).clamp(0.0, 1.0))
}
