//! Retention sweeper.
//!
//! Only direct-child files are considered. Missing or unreadable directories
//! are skipped, and per-file failures are collected without aborting.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::model::{RetentionPolicy, SweepFailure, SweepReport};

/// Delete files older than `policy.max_age_seconds` relative to `now`.
#[must_use]
pub fn sweep(policy: &RetentionPolicy, now: DateTime<Utc>) -> SweepReport {
    sweep_with(policy, now, |path| fs::remove_file(path))
}

fn sweep_with<R>(policy: &RetentionPolicy, now: DateTime<Utc>, mut remove: R) -> SweepReport
where
    R: FnMut(&Path) -> io::Result<()>,
{
    let mut report = SweepReport::default();
    for directory in &policy.directories {
        sweep_directory(
            directory,
            policy.max_age_seconds,
            now,
            &mut remove,
            &mut report,
        );
    }
    info!(
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        "retention sweep finished"
    );
    report
}

fn sweep_directory<R>(
    directory: &Path,
    max_age_seconds: u64,
    now: DateTime<Utc>,
    remove: &mut R,
    report: &mut SweepReport,
) where
    R: FnMut(&Path) -> io::Result<()>,
{
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(
                directory = %directory.display(),
                error = %err,
                "skipping unreadable retention directory"
            );
            report.skipped.push(directory.to_path_buf());
            return;
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(err) => {
                warn!(directory = %directory.display(), error = %err, "failed to read directory entry");
                continue;
            }
        };

        let modified = match fs::metadata(&path) {
            Ok(metadata) if !metadata.is_file() => continue,
            Ok(metadata) => metadata.modified(),
            Err(err) => Err(err),
        };
        let modified = match modified {
            Ok(modified) => DateTime::<Utc>::from(modified),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read file age");
                report.failed.push(SweepFailure {
                    path,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        if !is_expired(now, modified, max_age_seconds) {
            debug!(path = %path.display(), "keeping file within retention window");
            continue;
        }

        match remove(&path) {
            Ok(()) => {
                info!(path = %path.display(), "deleted old file");
                report.deleted.push(path);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to delete old file");
                report.failed.push(SweepFailure {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }
}

fn is_expired(now: DateTime<Utc>, modified: DateTime<Utc>, max_age_seconds: u64) -> bool {
    let age_ms = now.signed_duration_since(modified).num_milliseconds();
    u64::try_from(age_ms).is_ok_and(|age_ms| age_ms > max_age_seconds.saturating_mul(1_000))
}
