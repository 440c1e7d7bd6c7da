use plansync_config::{Settings, validate_settings};

use crate::cli::{ConfigSetArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_settings;

pub(crate) fn handle_config_show(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    render_settings(&ctx.settings, ctx.store.path(), format)
}

pub(crate) async fn handle_config_set(
    ctx: &AppContext,
    args: ConfigSetArgs,
    format: OutputFormat,
) -> CliResult<()> {
    if is_empty_change(&args) {
        return Err(CliError::validation(
            "no settings changes provided (see `plansync config set --help`)",
        ));
    }

    let updated = ctx
        .store
        .update(move |settings| {
            apply_changes(settings, args);
            validate_settings(settings)
        })
        .await?;

    if format == OutputFormat::Table {
        println!("Settings saved to {}.", ctx.store.path().display());
    }
    render_settings(&updated, ctx.store.path(), format)
}

fn is_empty_change(args: &ConfigSetArgs) -> bool {
    args.user_id.is_none()
        && args.formats.is_empty()
        && args.directories.is_empty()
        && args.retention_days.is_none()
}

fn apply_changes(settings: &mut Settings, args: ConfigSetArgs) {
    if let Some(user_id) = args.user_id {
        settings.username = user_id.trim().to_string();
    }
    if !args.formats.is_empty() {
        settings.formats = args.formats.into_iter().collect();
    }
    for (format, directory) in args.directories {
        if directory.is_empty() {
            settings.directories.remove(&format);
        } else {
            settings.directories.insert(format, directory);
        }
    }
    if let Some(days) = args.retention_days {
        settings.retention_days = days;
    }
}
