//! Temporary directory and file helpers for filesystem-backed tests.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

/// Seconds in one day.
pub const DAY_SECS: u64 = 86_400;

/// Create a fresh temporary directory with the workspace prefix.
///
/// # Errors
///
/// Returns an error when the temporary directory cannot be created.
pub fn temp_dir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix("plansync-")
        .tempdir()
        .context("failed to create temporary directory")
}

/// Write `contents` to `dir/name` and return the full path.
///
/// # Errors
///
/// Returns an error when the file cannot be written.
pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Backdate the modification time of `path` by `age`.
///
/// # Errors
///
/// Returns an error when the file cannot be opened or its mtime cannot be set.
pub fn age_file(path: &Path, age: Duration) -> Result<()> {
    let modified = SystemTime::now()
        .checked_sub(age)
        .ok_or_else(|| anyhow!("age {age:?} underflows the system clock"))?;
    let file = File::options()
        .write(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.set_modified(modified)
        .with_context(|| format!("failed to set mtime on {}", path.display()))
}

/// Sorted file names directly inside `dir`.
///
/// # Errors
///
/// Returns an error when the directory cannot be listed.
pub fn file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.display()))?
        .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>, _>>()?;
    names.sort();
    Ok(names)
}
