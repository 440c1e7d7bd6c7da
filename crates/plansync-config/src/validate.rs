//! Validation helpers and parsing utilities for settings documents.

use plansync_core::FormatId;
use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::model::Settings;

/// Check the settings values that cannot be expressed through types.
///
/// An empty username or format selection is allowed here; the sync run
/// rejects those when it starts.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for the first invalid value.
pub fn validate_settings(settings: &Settings) -> ConfigResult<()> {
    validate_http_url("metadata_url", &settings.metadata_url)?;
    validate_http_url("artifact_base_url", &settings.artifact_base_url)?;
    if settings.retention_days == 0 {
        return Err(ConfigError::invalid(
            "retention_days",
            Some("0".into()),
            "must be at least 1",
        ));
    }
    if settings.http_timeout_secs == 0 {
        return Err(ConfigError::invalid(
            "http_timeout_secs",
            Some("0".into()),
            "must be at least 1",
        ));
    }
    Ok(())
}

/// Parse a `FORMAT=PATH` directory assignment.
///
/// The path may be empty, which clears the directory for that format.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the `=` separator is missing or
/// the format is unknown.
pub fn parse_directory_assignment(raw: &str) -> ConfigResult<(FormatId, String)> {
    let (format, path) = raw.split_once('=').ok_or_else(|| {
        ConfigError::invalid("directories", Some(raw.to_string()), "expected FORMAT=PATH")
    })?;
    let format = format.trim().parse::<FormatId>().map_err(|_| {
        ConfigError::invalid(
            "directories",
            Some(format.trim().to_string()),
            "unknown format",
        )
    })?;
    Ok((format, path.trim().to_string()))
}

fn validate_http_url(field: &'static str, raw: &str) -> ConfigResult<()> {
    let url = Url::parse(raw).map_err(|_| {
        ConfigError::invalid(field, Some(raw.to_string()), "must be an absolute URL")
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::invalid(
            field,
            Some(raw.to_string()),
            "must use http or https",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn zero_retention_is_rejected() {
        let settings = Settings {
            retention_days: 0,
            ..Settings::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(ConfigError::InvalidField {
                field: "retention_days",
                ..
            })
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let settings = Settings {
            http_timeout_secs: 0,
            ..Settings::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(ConfigError::InvalidField {
                field: "http_timeout_secs",
                ..
            })
        ));
    }

    #[test]
    fn endpoints_must_be_http_urls() {
        let relative = Settings {
            metadata_url: "api/xml.fetcher.php".into(),
            ..Settings::default()
        };
        assert!(matches!(
            validate_settings(&relative),
            Err(ConfigError::InvalidField {
                field: "metadata_url",
                reason: "must be an absolute URL",
                ..
            })
        ));

        let ftp = Settings {
            artifact_base_url: "ftp://example.com/plans/".into(),
            ..Settings::default()
        };
        assert!(matches!(
            validate_settings(&ftp),
            Err(ConfigError::InvalidField {
                field: "artifact_base_url",
                reason: "must use http or https",
                ..
            })
        ));
    }

    #[test]
    fn directory_assignment_parses_format_and_path() -> ConfigResult<()> {
        assert_eq!(
            parse_directory_assignment("ff757=/sim/FlightFactor/routes")?,
            (FormatId::Ff757, "/sim/FlightFactor/routes".to_string())
        );
        assert_eq!(
            parse_directory_assignment("PDF=")?,
            (FormatId::Pdf, String::new())
        );
        Ok(())
    }

    #[test]
    fn directory_assignment_rejects_bad_input() {
        assert!(matches!(
            parse_directory_assignment("/sim/pdf"),
            Err(ConfigError::InvalidField {
                reason: "expected FORMAT=PATH",
                ..
            })
        ));
        assert!(matches!(
            parse_directory_assignment("A320=/sim"),
            Err(ConfigError::InvalidField {
                reason: "unknown format",
                ..
            })
        ));
    }
}
