use anyhow::anyhow;
use plansync_config::{Settings, validate_settings};
use plansync_core::{FlightplanSync, SyncOutcome, SyncRequest};
use tracing::info;

use crate::cli::{OutputFormat, SyncArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{ConsoleSink, render_sync_report};

pub(crate) async fn handle_sync(
    ctx: &AppContext,
    args: SyncArgs,
    format: OutputFormat,
) -> CliResult<()> {
    validate_settings(&ctx.settings)?;
    let request = merge_request(&ctx.settings, args);

    let engine = FlightplanSync::new(ctx.client.clone(), &ctx.settings.endpoints())?;
    let mut sink = ConsoleSink::new(format);
    let report = engine.run(&request, &ctx.store, &mut sink).await?;
    info!(
        saved = report.saved.len(),
        failed = report.failed.len(),
        "sync finished"
    );

    render_sync_report(&report, format)?;
    match report.outcome() {
        SyncOutcome::Complete | SyncOutcome::Partial => Ok(()),
        SyncOutcome::NoneSucceeded => Err(CliError::failure(anyhow!(
            "no flight plan files were downloaded"
        ))),
    }
}

/// Saved selection with this run's overrides applied on top.
fn merge_request(settings: &Settings, args: SyncArgs) -> SyncRequest {
    let mut request = settings.sync_request();
    if let Some(user_id) = args.user_id {
        request.user_id = user_id.trim().to_string();
    }
    if !args.formats.is_empty() {
        request.formats = args.formats.into_iter().collect();
    }
    request.directories.extend(args.directories);
    request
}
