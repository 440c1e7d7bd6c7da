//! Output renderers, formatting helpers, and the console progress sink.

use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use anyhow::anyhow;
use plansync_config::Settings;
use plansync_core::formats::FORMAT_SPECS;
use plansync_core::{FormatId, ProgressSink, SweepReport, SyncOutcome, SyncReport};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

const PROGRESS_WIDTH: usize = 30;

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

#[derive(Serialize)]
struct FormatRow {
    format: FormatId,
    url_token: &'static str,
    remote_suffix: &'static str,
    file_extension: &'static str,
}

pub(crate) fn render_formats(format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<FormatRow> = FORMAT_SPECS
                .iter()
                .map(|spec| FormatRow {
                    format: spec.format,
                    url_token: spec.url_token,
                    remote_suffix: spec.remote_suffix,
                    file_extension: spec.file_extension,
                })
                .collect();
            print_json(&rows)
        }
        OutputFormat::Table => {
            print!("{}", formats_table());
            Ok(())
        }
    }
}

pub(crate) fn formats_table() -> String {
    let mut out = format!(
        "{:<7} {:<6} {:<10} {}\n",
        "FORMAT", "TOKEN", "REMOTE", "EXTENSION"
    );
    for spec in &FORMAT_SPECS {
        let _ = writeln!(
            out,
            "{:<7} {:<6} {:<10} {}",
            spec.format, spec.url_token, spec.remote_suffix, spec.file_extension
        );
    }
    out
}

#[derive(Serialize)]
struct SyncReportView<'a> {
    outcome: SyncOutcome,
    #[serde(flatten)]
    report: &'a SyncReport,
}

pub(crate) fn render_sync_report(report: &SyncReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&SyncReportView {
            outcome: report.outcome(),
            report,
        }),
        OutputFormat::Table => {
            print!("{}", sync_report_table(report));
            Ok(())
        }
    }
}

pub(crate) fn sync_report_table(report: &SyncReport) -> String {
    let metadata = &report.metadata;
    let mut out = format!(
        "route: {} -> {} ({})\n",
        metadata.origin_icao,
        metadata.destination_icao,
        if report.new_route { "new" } else { "unchanged" }
    );
    for saved in &report.saved {
        let _ = writeln!(
            out,
            "saved  {:<6} {} ({})",
            saved.format,
            saved.path.display(),
            format_bytes(saved.bytes)
        );
    }
    for failed in &report.failed {
        let _ = writeln!(out, "failed {:<6} {}", failed.format, failed.reason);
    }
    out
}

#[derive(Serialize)]
struct SweepReportView<'a> {
    max_age_days: u64,
    #[serde(flatten)]
    report: &'a SweepReport,
}

pub(crate) fn render_sweep_report(
    report: &SweepReport,
    max_age_days: u64,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&SweepReportView {
            max_age_days,
            report,
        }),
        OutputFormat::Table => {
            print!("{}", sweep_report_table(report));
            Ok(())
        }
    }
}

pub(crate) fn sweep_report_table(report: &SweepReport) -> String {
    let mut out = String::new();
    for path in &report.deleted {
        let _ = writeln!(out, "Deleted old file: {}", path.display());
    }
    for failure in &report.failed {
        let _ = writeln!(
            out,
            "Failed to delete {}: {}",
            failure.path.display(),
            failure.reason
        );
    }
    for path in &report.skipped {
        let _ = writeln!(out, "Skipped unreadable directory: {}", path.display());
    }
    let _ = writeln!(
        out,
        "Cleanup complete: {} deleted, {} failed.",
        report.deleted.len(),
        report.failed.len()
    );
    out
}

#[derive(Serialize)]
struct SettingsView<'a> {
    path: &'a Path,
    #[serde(flatten)]
    settings: &'a Settings,
}

pub(crate) fn render_settings(
    settings: &Settings,
    path: &Path,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&SettingsView { path, settings }),
        OutputFormat::Table => {
            print!("{}", settings_table(settings, path));
            Ok(())
        }
    }
}

pub(crate) fn settings_table(settings: &Settings, path: &Path) -> String {
    let mut out = format!("settings file: {}\n", path.display());
    let username = if settings.username.trim().is_empty() {
        "<unset>"
    } else {
        settings.username.as_str()
    };
    let _ = writeln!(out, "username: {username}");
    let formats: Vec<&str> = settings.formats.iter().map(|format| format.as_str()).collect();
    let _ = writeln!(
        out,
        "formats: {}",
        if formats.is_empty() {
            "<none>".to_string()
        } else {
            formats.join(", ")
        }
    );
    let _ = writeln!(out, "directories:");
    for format in FormatId::ALL {
        let directory = settings
            .directories
            .get(&format)
            .map(String::as_str)
            .filter(|dir| !dir.trim().is_empty())
            .unwrap_or("<unset>");
        let _ = writeln!(out, "  {format:<6} {directory}");
    }
    let _ = writeln!(out, "retention days: {}", settings.retention_days);
    let _ = writeln!(out, "metadata url: {}", settings.metadata_url);
    let _ = writeln!(out, "artifact base url: {}", settings.artifact_base_url);
    let _ = writeln!(out, "http timeout: {}s", settings.http_timeout_secs);
    match &settings.last_flight_info {
        Some(last) => {
            let _ = writeln!(
                out,
                "last route: {} ({} {}, {})",
                last.base_name(),
                last.icao_airline,
                last.flight_number,
                last.aircraft_type
            );
        }
        None => {
            let _ = writeln!(out, "last route: <none>");
        }
    }
    out
}

/// Progress sink writing run log lines to the console.
///
/// With table output the log lines go to stdout; with JSON output they go to
/// stderr so stdout carries only the report. The progress bar is drawn on
/// stderr when it is a terminal.
pub(crate) struct ConsoleSink {
    echo_stdout: bool,
    show_progress: bool,
    last_percent: Option<u8>,
}

impl ConsoleSink {
    pub(crate) fn new(format: OutputFormat) -> Self {
        Self {
            echo_stdout: format == OutputFormat::Table,
            show_progress: io::stderr().is_terminal(),
            last_percent: None,
        }
    }

    fn finish_progress_line(&mut self) {
        if self.last_percent.take().is_some() {
            eprintln!();
        }
    }
}

impl ProgressSink for ConsoleSink {
    fn log(&mut self, line: &str) {
        self.finish_progress_line();
        if self.echo_stdout {
            println!("{line}");
        } else {
            eprintln!("{line}");
        }
    }

    fn progress(&mut self, fraction: f64) {
        if !self.show_progress {
            return;
        }
        let percent = percent(fraction);
        if self.last_percent == Some(percent) {
            return;
        }
        self.last_percent = Some(percent);
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r{}", progress_bar(percent));
        let _ = stderr.flush();
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(fraction: f64) -> u8 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * PROGRESS_WIDTH / 100;
    format!(
        "[{}{}] {percent:>3}%",
        "#".repeat(filled),
        " ".repeat(PROGRESS_WIDTH - filled)
    )
}

#[must_use]
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    let value = bytes_to_f64(bytes);
    if value >= MIB {
        format!("{:.2} MiB", value / MIB)
    } else if value >= KIB {
        format!("{:.2} KiB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}

fn bytes_to_f64(value: u64) -> f64 {
    let high = u32::try_from(value >> 32).unwrap_or(u32::MAX);
    let low = u32::try_from(value & 0xFFFF_FFFF).unwrap_or(u32::MAX);
    f64::from(high) * 4_294_967_296.0 + f64::from(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plansync_core::{FlightMetadata, FormatFailure, SavedArtifact, SweepFailure};
    use std::path::PathBuf;

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
    fn formats_table_lists_every_format() {
        let table = formats_table();
        assert_eq!(table.lines().count(), 7);
        assert!(table.contains("FF757   VMX    flp--VM5   flp"));
        assert!(table.contains("TDS     GTN    gfp--VM5   gfp"));
    }

    #[test]
    fn sync_report_table_lists_saved_and_failed() {
        let report = SyncReport {
            metadata: metadata(),
            new_route: true,
            saved: vec![SavedArtifact {
                format: FormatId::Fms,
                path: PathBuf::from("/sim/fms/KJFKKLAX01.fms"),
                bytes: 2048,
            }],
            failed: vec![FormatFailure {
                format: FormatId::Pdf,
                reason: "network request failed".into(),
            }],
        };
        let table = sync_report_table(&report);
        assert!(table.starts_with("route: KJFK -> KLAX (new)"));
        assert!(table.contains("saved  FMS    /sim/fms/KJFKKLAX01.fms (2.00 KiB)"));
        assert!(table.contains("failed PDF    network request failed"));
    }

    #[test]
    fn sync_report_json_includes_outcome() -> serde_json::Result<()> {
        let report = SyncReport {
            metadata: metadata(),
            new_route: false,
            saved: Vec::new(),
            failed: Vec::new(),
        };
        let value = serde_json::to_value(SyncReportView {
            outcome: report.outcome(),
            report: &report,
        })?;
        assert_eq!(value["outcome"], "none_succeeded");
        assert_eq!(value["metadata"]["origin_icao"], "KJFK");
        Ok(())
    }

    #[test]
    fn sweep_table_summarises_counts() {
        let report = SweepReport {
            deleted: vec![PathBuf::from("/sim/pdf/KJFKKLAX01.pdf")],
            failed: vec![SweepFailure {
                path: PathBuf::from("/sim/pdf/locked.pdf"),
                reason: "permission denied".into(),
            }],
            skipped: Vec::new(),
        };
        let table = sweep_report_table(&report);
        assert!(table.contains("Deleted old file: /sim/pdf/KJFKKLAX01.pdf"));
        assert!(table.contains("Failed to delete /sim/pdf/locked.pdf: permission denied"));
        assert!(table.ends_with("Cleanup complete: 1 deleted, 1 failed.\n"));
    }

    #[test]
    fn settings_table_marks_unset_values() {
        let table = settings_table(&Settings::default(), Path::new("/home/pilot/settings.json"));
        assert!(table.contains("username: <unset>"));
        assert!(table.contains("formats: <none>"));
        assert!(table.contains("  FF767  <unset>"));
        assert!(table.contains("last route: <none>"));
    }

    #[test]
    fn progress_bar_scales_with_percent() {
        assert_eq!(percent(0.504), 50);
        assert_eq!(percent(7.0), 100);
        assert_eq!(progress_bar(0), format!("[{}]   0%", " ".repeat(30)));
        assert_eq!(progress_bar(100), format!("[{}] 100%", "#".repeat(30)));
    }

    #[test]
    fn format_bytes_picks_unit() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MiB");
    }
}
