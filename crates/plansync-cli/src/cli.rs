//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use plansync_config::{CONFIG_ENV, parse_directory_assignment};
use plansync_core::FormatId;
use plansync_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging, run_span};
use tracing::Instrument;
use uuid::Uuid;

use crate::client::{AppContext, CliResult};
use crate::commands::clean::handle_clean;
use crate::commands::config::{handle_config_set, handle_config_show};
use crate::commands::sync::handle_sync;
use crate::output::render_formats;

/// Parses CLI arguments, installs logging, executes the requested command,
/// and returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    install_logging(&logging_config(cli.verbose, cli.log_format));

    let trace_id = Uuid::new_v4().to_string();
    let span = run_span(command_label(&cli.command), &trace_id);

    match execute(cli, &trace_id).instrument(span).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

pub(crate) async fn execute(cli: Cli, trace_id: &str) -> CliResult<()> {
    let Cli {
        config,
        timeout,
        output,
        command,
        ..
    } = cli;

    if matches!(command, Command::Formats) {
        return render_formats(output);
    }

    let ctx = AppContext::load(config, timeout, trace_id).await?;
    match command {
        Command::Sync(args) => handle_sync(&ctx, args, output).await,
        Command::Clean(args) => handle_clean(&ctx, args, output).await,
        Command::Formats => render_formats(output),
        Command::Config(ConfigCommand::Show) => handle_config_show(&ctx, output),
        Command::Config(ConfigCommand::Set(args)) => handle_config_set(&ctx, args, output).await,
    }
}

fn logging_config(verbose: bool, log_format: LogFormatArg) -> LoggingConfig<'static> {
    LoggingConfig {
        level: if verbose { "debug" } else { DEFAULT_LOG_LEVEL },
        format: log_format.into(),
        build_sha: env!("CARGO_PKG_VERSION"),
    }
}

fn install_logging(config: &LoggingConfig<'_>) {
    if let Err(err) = init_logging(config) {
        eprintln!("warning: {err}");
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "plansync",
    version,
    about = "Download the latest flight plan in every simulator format you use"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = CONFIG_ENV,
        help = "Settings file (defaults to ~/.plansync/settings.json)"
    )]
    pub(crate) config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "PLANSYNC_HTTP_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "HTTP timeout in seconds (overrides the settings file)"
    )]
    pub(crate) timeout: Option<u64>,
    #[arg(
        long = "output",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(short, long, global = true, help = "Log debug details to stderr")]
    pub(crate) verbose: bool,
    #[arg(
        long,
        global = true,
        value_enum,
        env = "PLANSYNC_LOG_FORMAT",
        default_value_t = LogFormatArg::Pretty,
        help = "Log line format written to stderr"
    )]
    pub(crate) log_format: LogFormatArg,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Fetch the latest flight plan and download every enabled format.
    Sync(SyncArgs),
    /// Delete flight plan files older than the retention window.
    Clean(CleanArgs),
    /// List supported formats and their remote file names.
    Formats,
    /// Inspect or change the settings file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub(crate) enum ConfigCommand {
    /// Print the current settings.
    Show,
    /// Change and save settings.
    Set(ConfigSetArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct SyncArgs {
    #[arg(long, help = "Planning service user id for this run")]
    pub(crate) user_id: Option<String>,
    #[arg(
        long = "format",
        value_parser = parse_format,
        help = "Format to download this run (repeatable; replaces the saved selection)"
    )]
    pub(crate) formats: Vec<FormatId>,
    #[arg(
        long = "dir",
        value_name = "FORMAT=PATH",
        value_parser = parse_directory,
        help = "Target directory for one format this run (repeatable)"
    )]
    pub(crate) directories: Vec<(FormatId, String)>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CleanArgs {
    #[arg(
        long,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Age threshold in days (defaults to the saved retention window)"
    )]
    pub(crate) max_age_days: Option<u64>,
    #[arg(short, long, help = "Skip the confirmation prompt")]
    pub(crate) yes: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ConfigSetArgs {
    #[arg(long, help = "Planning service user id")]
    pub(crate) user_id: Option<String>,
    #[arg(
        long = "format",
        value_parser = parse_format,
        help = "Enabled format (repeatable; replaces the saved selection)"
    )]
    pub(crate) formats: Vec<FormatId>,
    #[arg(
        long = "dir",
        value_name = "FORMAT=PATH",
        value_parser = parse_directory,
        help = "Target directory for one format; an empty path clears it (repeatable)"
    )]
    pub(crate) directories: Vec<(FormatId, String)>,
    #[arg(long, help = "Retention window in days used by `clean`")]
    pub(crate) retention_days: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Sync(_) => "sync",
        Command::Clean(_) => "clean",
        Command::Formats => "formats",
        Command::Config(ConfigCommand::Show) => "config_show",
        Command::Config(ConfigCommand::Set(_)) => "config_set",
    }
}

fn parse_format(raw: &str) -> Result<FormatId, String> {
    raw.parse::<FormatId>().map_err(|_| {
        let known = FormatId::ALL.map(FormatId::as_str).join(", ");
        format!("unknown format '{raw}' (expected one of {known})")
    })
}

fn parse_directory(raw: &str) -> Result<(FormatId, String), String> {
    parse_directory_assignment(raw).map_err(|err| err.detail())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sync_collects_format_and_directory_overrides() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from([
            "plansync",
            "sync",
            "--user-id",
            "123456",
            "--format",
            "pdf",
            "--format",
            "FF767",
            "--dir",
            "FF767=/sim/ff",
        ])?;
        let Command::Sync(args) = cli.command else {
            panic!("expected sync command");
        };
        assert_eq!(args.user_id.as_deref(), Some("123456"));
        assert_eq!(args.formats, vec![FormatId::Pdf, FormatId::Ff767]);
        assert_eq!(
            args.directories,
            vec![(FormatId::Ff767, "/sim/ff".to_string())]
        );
        Ok(())
    }

    #[test]
    fn unknown_format_is_rejected_by_parser() {
        let err = Cli::try_parse_from(["plansync", "sync", "--format", "A320"])
            .expect_err("A320 is not a format");
        assert!(err.to_string().contains("unknown format 'A320'"));
    }

    #[test]
    fn global_flags_apply_after_subcommand() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from([
            "plansync",
            "clean",
            "--yes",
            "--output",
            "json",
            "--config",
            "/tmp/plansync.json",
        ])?;
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/plansync.json")));
        assert!(matches!(cli.command, Command::Clean(CleanArgs { yes: true, .. })));
        Ok(())
    }

    #[test]
    fn log_format_selects_json_layer() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from(["plansync", "formats", "--log-format", "json", "-v"])?;
        let config = logging_config(cli.verbose, cli.log_format);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "debug");

        let cli = Cli::try_parse_from(["plansync", "formats"])?;
        let config = logging_config(cli.verbose, cli.log_format);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.level, DEFAULT_LOG_LEVEL);
        Ok(())
    }

    #[test]
    fn zero_day_threshold_is_rejected() {
        assert!(Cli::try_parse_from(["plansync", "clean", "--max-age-days", "0"]).is_err());
    }

    #[test]
    fn command_labels_are_stable() {
        assert_eq!(command_label(&Command::Formats), "formats");
        assert_eq!(
            command_label(&Command::Config(ConfigCommand::Show)),
            "config_show"
        );
    }
}
