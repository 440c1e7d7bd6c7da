#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Flight plan synchronisation engine.
//!
//! Layout:
//! - `metadata.rs`: OFP metadata client and response parsing
//! - `route.rs`: route change detection
//! - `formats.rs`: per-format artifact table and URL locator
//! - `allocate.rs`: collision-free filename allocation
//! - `download.rs`: streaming artifact downloader with progress reporting
//! - `sweep.rs`: retention sweeper for stale artifacts
//! - `sync.rs`: single-run orchestration and collaborator traits

pub mod allocate;
pub mod defaults;
pub mod download;
pub mod error;
pub mod formats;
pub mod metadata;
pub mod model;
pub mod route;
pub mod sweep;
pub mod sync;

pub use allocate::next_filename;
pub use download::{ArtifactDownloader, DownloadedArtifact};
pub use error::{SyncError, SyncResult};
pub use formats::{ArtifactLocation, ArtifactLocator, FormatId, FormatSpec};
pub use metadata::MetadataClient;
pub use model::{
    DownloadTarget, FlightMetadata, FormatFailure, RetentionPolicy, SavedArtifact, SweepFailure,
    SweepReport, SyncOutcome, SyncReport,
};
pub use route::is_new_route;
pub use sweep::sweep;
pub use sync::{Endpoints, FlightplanSync, ProgressSink, SettingsStore, StoreError, SyncRequest};
