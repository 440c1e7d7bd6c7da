use std::io::{self, BufRead, Write};

use anyhow::anyhow;
use chrono::Utc;
use plansync_config::{Settings, validate_settings};
use plansync_core::{RetentionPolicy, sweep};

use crate::cli::{CleanArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_sweep_report;

/// Resolved sweep: threshold and the directories it covers.
#[derive(Debug)]
pub(crate) struct CleanupPlan {
    pub(crate) max_age_days: u64,
    pub(crate) policy: RetentionPolicy,
}

pub(crate) async fn handle_clean(
    ctx: &AppContext,
    args: CleanArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let plan = plan_cleanup(&ctx.settings, &args)?;
    if !args.yes {
        let confirmed = confirm_cleanup(&plan, &mut io::stdin().lock(), &mut io::stderr())?;
        if !confirmed {
            eprintln!("Cleanup cancelled.");
            return Ok(());
        }
    }
    execute_cleanup(plan, format).await
}

pub(crate) fn plan_cleanup(settings: &Settings, args: &CleanArgs) -> CliResult<CleanupPlan> {
    validate_settings(settings)?;
    let max_age_days = args.max_age_days.unwrap_or(settings.retention_days);
    let policy = settings.retention_policy(max_age_days);
    if policy.directories.is_empty() {
        return Err(CliError::validation(
            "no target directories configured (set one with `plansync config set --dir FORMAT=PATH`)",
        ));
    }
    Ok(CleanupPlan {
        max_age_days,
        policy,
    })
}

/// Ask for confirmation; anything other than `y`/`yes` declines.
pub(crate) fn confirm_cleanup(
    plan: &CleanupPlan,
    input: &mut impl BufRead,
    prompt: &mut impl Write,
) -> CliResult<bool> {
    write!(
        prompt,
        "Delete all flightplan files older than {} days in the target directories? [y/N] ",
        plan.max_age_days
    )
    .and_then(|()| prompt.flush())
    .map_err(|err| CliError::failure(anyhow!("failed to write prompt: {err}")))?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|err| CliError::failure(anyhow!("failed to read confirmation: {err}")))?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

pub(crate) async fn execute_cleanup(plan: CleanupPlan, format: OutputFormat) -> CliResult<()> {
    let CleanupPlan {
        max_age_days,
        policy,
    } = plan;
    let report = tokio::task::spawn_blocking(move || sweep(&policy, Utc::now()))
        .await
        .map_err(|err| CliError::failure(anyhow!("retention sweep task failed: {err}")))?;
    render_sweep_report(&report, max_age_days, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use plansync_core::FormatId;
    use plansync_test_support::fs::{DAY_SECS, age_file, file_names, temp_dir, write_file};
    use std::io::Cursor;
    use std::time::Duration;

    fn settings_with(dir: &std::path::Path) -> Settings {
        Settings {
            directories: [
                (FormatId::Pdf, dir.display().to_string()),
                (FormatId::Fms, String::new()),
            ]
            .into(),
            ..Settings::default()
        }
    }

    #[test]
    fn plan_uses_saved_retention_unless_overridden() -> Result<()> {
        let dir = temp_dir()?;
        let settings = settings_with(dir.path());
        let plan = plan_cleanup(&settings, &CleanArgs::default())
            .map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(plan.max_age_days, 7);
        assert_eq!(plan.policy.directories.len(), 1);

        let plan = plan_cleanup(
            &settings,
            &CleanArgs {
                max_age_days: Some(2),
                yes: true,
            },
        )
        .map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(plan.policy.max_age_seconds, 2 * DAY_SECS);
        Ok(())
    }

    #[test]
    fn plan_without_directories_is_a_validation_error() {
        let err = plan_cleanup(&Settings::default(), &CleanArgs::default())
            .expect_err("nothing to sweep");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn confirmation_accepts_only_yes() -> Result<()> {
        let dir = temp_dir()?;
        let plan = plan_cleanup(&settings_with(dir.path()), &CleanArgs::default())
            .map_err(|err| anyhow!(err.display_message()))?;

        for (answer, expected) in [("y\n", true), ("YES\n", true), ("n\n", false), ("", false)] {
            let mut prompt = Vec::new();
            let confirmed = confirm_cleanup(&plan, &mut Cursor::new(answer), &mut prompt)
                .map_err(|err| anyhow!(err.display_message()))?;
            assert_eq!(confirmed, expected, "answer {answer:?}");
            assert_eq!(
                String::from_utf8(prompt)?,
                "Delete all flightplan files older than 7 days in the target directories? [y/N] "
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn cleanup_deletes_only_expired_files() -> Result<()> {
        let dir = temp_dir()?;
        let old = write_file(dir.path(), "KJFKKLAX01.pdf", b"old")?;
        let recent = write_file(dir.path(), "KJFKKLAX02.pdf", b"recent")?;
        age_file(&old, Duration::from_secs(8 * DAY_SECS))?;
        age_file(&recent, Duration::from_secs(DAY_SECS))?;

        let plan = plan_cleanup(&settings_with(dir.path()), &CleanArgs::default())
            .map_err(|err| anyhow!(err.display_message()))?;
        execute_cleanup(plan, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        assert_eq!(file_names(dir.path())?, vec!["KJFKKLAX02.pdf"]);
        Ok(())
    }
}
