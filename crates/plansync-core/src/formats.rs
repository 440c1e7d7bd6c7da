//! Output formats and the artifact locator.
//!
//! Every format maps to exactly one remote naming token, remote suffix, and
//! local extension. `FF757` and `FF767` share the `VMX` artifact.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{SyncError, SyncResult};
use crate::model::FlightMetadata;

/// Supported output formats, declared in synchronisation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormatId {
    /// Printable flight plan briefing.
    Pdf,
    /// X-Plane 11 FMS plan.
    Fms,
    /// FlightFactor 757 route file.
    Ff757,
    /// FlightFactor 767 route file.
    Ff767,
    /// X-Plane 12 FMS plan.
    Xpe,
    /// TDS GTNXi flight plan.
    Tds,
}

impl FormatId {
    /// All formats in the fixed order used by a synchronisation run.
    pub const ALL: [Self; 6] = [
        Self::Pdf,
        Self::Fms,
        Self::Ff757,
        Self::Ff767,
        Self::Xpe,
        Self::Tds,
    ];

    /// Upper-case label used in settings files and CLI flags.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Fms => "FMS",
            Self::Ff757 => "FF757",
            Self::Ff767 => "FF767",
            Self::Xpe => "XPE",
            Self::Tds => "TDS",
        }
    }

    /// Static artifact description for this format.
    #[must_use]
    pub const fn spec(self) -> &'static FormatSpec {
        match self {
            Self::Pdf => &FORMAT_SPECS[0],
            Self::Fms => &FORMAT_SPECS[1],
            Self::Ff757 => &FORMAT_SPECS[2],
            Self::Ff767 => &FORMAT_SPECS[3],
            Self::Xpe => &FORMAT_SPECS[4],
            Self::Tds => &FORMAT_SPECS[5],
        }
    }
}

impl Display for FormatId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.pad(self.as_str())
    }
}

impl FromStr for FormatId {
    type Err = SyncError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                SyncError::invalid("format", "is not a supported format", Some(value.to_string()))
            })
    }
}

/// Remote naming and local storage details for one format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatSpec {
    /// Format this entry describes.
    pub format: FormatId,
    /// Token embedded in the remote file name.
    pub url_token: &'static str,
    /// Suffix of the remote file.
    pub remote_suffix: &'static str,
    /// Extension used for the locally stored file.
    pub file_extension: &'static str,
}

/// Lookup table backing [`FormatId::spec`], in [`FormatId::ALL`] order.
pub const FORMAT_SPECS: [FormatSpec; 6] = [
    FormatSpec {
        format: FormatId::Pdf,
        url_token: "PDF",
        remote_suffix: "pdf",
        file_extension: "pdf",
    },
    FormatSpec {
        format: FormatId::Fms,
        url_token: "XPN",
        remote_suffix: "fms",
        file_extension: "fms",
    },
    FormatSpec {
        format: FormatId::Ff757,
        url_token: "VMX",
        remote_suffix: "flp--VM5",
        file_extension: "flp",
    },
    FormatSpec {
        format: FormatId::Ff767,
        url_token: "VMX",
        remote_suffix: "flp--VM5",
        file_extension: "flp",
    },
    FormatSpec {
        format: FormatId::Xpe,
        url_token: "XPE",
        remote_suffix: "fms",
        file_extension: "fms",
    },
    FormatSpec {
        format: FormatId::Tds,
        url_token: "GTN",
        remote_suffix: "gfp--VM5",
        file_extension: "gfp",
    },
];

/// Resolved download location for one format of one fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactLocation {
    /// Local base name (`{origin}{destination}`) used by the filename allocator.
    pub base_name: String,
    /// Absolute download URL.
    pub url: String,
    /// Extension of the locally stored file.
    pub extension: &'static str,
}

/// Builds deterministic artifact URLs under a fixed prefix.
#[derive(Clone, Debug)]
pub struct ArtifactLocator {
    base_url: String,
}

impl ArtifactLocator {
    /// Create a locator for the given URL prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidRequest`] when the prefix is not an absolute URL.
    pub fn new(base_url: &str) -> SyncResult<Self> {
        let parsed = Url::parse(base_url.trim()).map_err(|_| {
            SyncError::invalid(
                "artifact_base_url",
                "must be an absolute URL",
                Some(base_url.to_string()),
            )
        })?;
        let mut base_url = parsed.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self { base_url })
    }

    /// URL prefix shared by all artifacts.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a format and metadata snapshot to its download URL and local extension.
    #[must_use]
    pub fn locate(&self, spec: &FormatSpec, metadata: &FlightMetadata) -> ArtifactLocation {
        let base_name = metadata.base_name();
        let url = format!(
            "{}{base_name}_{}_{}.{}",
            self.base_url, spec.url_token, metadata.time_generated, spec.remote_suffix
        );
        ArtifactLocation {
            base_name,
            url,
            extension: spec.file_extension,
        }
    }
}
