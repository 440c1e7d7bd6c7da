//! Collision-free filename allocation.
//!
//! Names follow `{base}{counter:02}.{ext}` starting at `01`. The scan is a
//! snapshot of the directory listing and is not atomic against concurrent
//! writers; a run allocates and downloads one format at a time.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::{SyncError, SyncResult};

/// Return the first `{base_name}{NN}.{extension}` not present in `directory`.
///
/// A directory that does not exist yet is treated as empty.
///
/// # Errors
///
/// - [`SyncError::InvalidRequest`] when the candidate name is not a single path component.
/// - [`SyncError::DirectoryUnreadable`] when the directory cannot be listed.
pub fn next_filename(directory: &Path, base_name: &str, extension: &str) -> SyncResult<String> {
    let first = format!("{base_name}01.{extension}");
    if Path::new(&first).file_name() != Some(OsStr::new(&first)) {
        return Err(SyncError::invalid(
            "filename",
            "must be a plain file name",
            Some(first),
        ));
    }
    let existing = list_entries(directory)?;
    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{base_name}{counter:02}.{extension}");
        if !existing.contains(OsStr::new(&candidate)) {
            debug!(
                directory = %directory.display(),
                filename = %candidate,
                "allocated filename"
            );
            return Ok(candidate);
        }
        counter += 1;
    }
}

fn list_entries(directory: &Path) -> SyncResult<HashSet<OsString>> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(source) => {
            return Err(SyncError::directory_unreadable(
                "list_directory",
                directory,
                source,
            ));
        }
    };

    entries
        .map(|entry| entry.map(|entry| entry.file_name()))
        .collect::<io::Result<HashSet<_>>>()
        .map_err(|source| SyncError::directory_unreadable("list_directory", directory, source))
}
