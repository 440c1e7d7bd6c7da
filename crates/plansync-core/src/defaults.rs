//! Default endpoints and retention values.

/// OFP metadata fetcher endpoint.
pub const METADATA_URL: &str = "https://www.simbrief.com/api/xml.fetcher.php";
/// Prefix under which per-format flight plan files are published.
pub const ARTIFACT_BASE_URL: &str = "https://www.simbrief.com/ofp/flightplans/";
/// Default retention window in days.
pub const RETENTION_DAYS: u64 = 7;
/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 86_400;
/// Default HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;
