//! Data carriers shared by the synchronisation components.
//!
//! # Design
//! - Pure data; IO lives in the component modules.
//! - Every type that reaches the CLI or the settings file is serde-serializable.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults::SECONDS_PER_DAY;
use crate::formats::FormatId;

/// Immutable snapshot of one metadata fetch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightMetadata {
    /// Operator ICAO code, or `Private Charter` when absent.
    pub icao_airline: String,
    /// Flight number, or `N/A` when absent.
    pub flight_number: String,
    /// Aircraft ICAO type designator.
    pub aircraft_type: String,
    /// Departure airport ICAO code.
    pub origin_icao: String,
    /// Arrival airport ICAO code.
    pub destination_icao: String,
    /// Departure airport display name.
    pub origin_name: String,
    /// Arrival airport display name.
    pub destination_name: String,
    /// Generation timestamp the service embeds in artifact names.
    pub time_generated: String,
}

impl FlightMetadata {
    /// Base name shared by every artifact of this route (`{origin}{destination}`).
    #[must_use]
    pub fn base_name(&self) -> String {
        format!("{}{}", self.origin_icao, self.destination_icao)
    }

    /// One-line flight summary for display.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Flight {} {} | Aircraft: {} | {} ➔ {} | {} ➔ {}",
            self.icao_airline,
            self.flight_number,
            self.aircraft_type,
            self.origin_icao,
            self.destination_icao,
            self.origin_name,
            self.destination_name
        )
    }
}

/// Fully resolved download for one format in one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Format being downloaded.
    pub format: FormatId,
    /// Directory the artifact is written to.
    pub target_directory: PathBuf,
    /// Remote URL of the artifact.
    pub source_url: String,
    /// Collision-free file name inside `target_directory`.
    pub allocated_filename: String,
}

impl DownloadTarget {
    /// Full destination path.
    #[must_use]
    pub fn destination(&self) -> PathBuf {
        self.target_directory.join(&self.allocated_filename)
    }
}

/// Age-based deletion policy for one sweep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Files strictly older than this many seconds are deleted.
    pub max_age_seconds: u64,
    /// Directories whose direct children are swept.
    pub directories: BTreeSet<PathBuf>,
}

impl RetentionPolicy {
    /// Policy expressed in whole days.
    pub fn days<I, P>(days: u64, directories: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            max_age_seconds: days.saturating_mul(SECONDS_PER_DAY),
            directories: directories
                .into_iter()
                .map(|dir| dir.as_ref().to_path_buf())
                .collect(),
        }
    }
}

/// A file the sweeper could not inspect or delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SweepFailure {
    /// File path.
    pub path: PathBuf,
    /// Failure description.
    pub reason: String,
}

/// Outcome of one retention sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Files that were deleted.
    pub deleted: Vec<PathBuf>,
    /// Files whose deletion failed.
    pub failed: Vec<SweepFailure>,
    /// Directories that were missing or unreadable.
    pub skipped: Vec<PathBuf>,
}

/// Artifact written during a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SavedArtifact {
    /// Format of the artifact.
    pub format: FormatId,
    /// Path the artifact was written to.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
}

/// Format that could not be synchronised during a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormatFailure {
    /// Failed format.
    pub format: FormatId,
    /// Failure description.
    pub reason: String,
}

/// Aggregate classification of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Every enabled format was saved.
    Complete,
    /// Some formats were saved, some failed.
    Partial,
    /// No enabled format was saved.
    NoneSucceeded,
}

/// Result of one synchronisation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Metadata fetched at the start of the run.
    pub metadata: FlightMetadata,
    /// Whether the fetch differs from the last recorded route.
    pub new_route: bool,
    /// Artifacts written, in download order.
    pub saved: Vec<SavedArtifact>,
    /// Per-format failures, in download order.
    pub failed: Vec<FormatFailure>,
}

impl SyncReport {
    /// Classify the run.
    #[must_use]
    pub fn outcome(&self) -> SyncOutcome {
        if self.saved.is_empty() {
            SyncOutcome::NoneSucceeded
        } else if self.failed.is_empty() {
            SyncOutcome::Complete
        } else {
            SyncOutcome::Partial
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> FlightMetadata {
        FlightMetadata {
            icao_airline: "DAL".into(),
            flight_number: "423".into(),
            aircraft_type: "B763".into(),
            origin_icao: "KJFK".into(),
            destination_icao: "KLAX".into(),
            origin_name: "John F Kennedy Intl".into(),
            destination_name: "Los Angeles Intl".into(),
            time_generated: "1718035200".into(),
        }
    }

    #[test]
    fn summary_matches_display_layout() {
        assert_eq!(
            metadata().summary(),
            "Flight DAL 423 | Aircraft: B763 | KJFK ➔ KLAX | John F Kennedy Intl ➔ Los Angeles Intl"
        );
    }

    #[test]
    fn retention_days_converts_to_seconds() {
        let policy = RetentionPolicy::days(7, ["/a", "/b", "/a"]);
        assert_eq!(policy.max_age_seconds, 7 * 86_400);
        assert_eq!(policy.directories.len(), 2);
    }

    #[test]
    fn outcome_classifies_reports() {
        let saved = SavedArtifact {
            format: FormatId::Pdf,
            path: PathBuf::from("/plans/KJFKKLAX01.pdf"),
            bytes: 3,
        };
        let failure = FormatFailure {
            format: FormatId::Fms,
            reason: "boom".into(),
        };
        let mut report = SyncReport {
            metadata: metadata(),
            new_route: true,
            saved: vec![saved],
            failed: Vec::new(),
        };
        assert_eq!(report.outcome(), SyncOutcome::Complete);

        report.failed.push(failure);
        assert_eq!(report.outcome(), SyncOutcome::Partial);

        report.saved.clear();
        assert_eq!(report.outcome(), SyncOutcome::NoneSucceeded);
    }

    #[test]
    fn download_target_joins_destination() {
        let target = DownloadTarget {
            format: FormatId::Pdf,
            target_directory: PathBuf::from("/plans"),
            source_url: "http://host/a.pdf".into(),
            allocated_filename: "KJFKKLAX01.pdf".into(),
        };
        assert_eq!(target.destination(), PathBuf::from("/plans/KJFKKLAX01.pdf"));
    }
}
