//! Route change detection.

use crate::model::FlightMetadata;

/// Whether `current` differs from the last recorded snapshot.
///
/// Equality is structural over every field; no previous snapshot always
/// counts as a new route.
#[must_use]
pub fn is_new_route(current: &FlightMetadata, previous: Option<&FlightMetadata>) -> bool {
    previous.is_none_or(|previous| previous != current)
}
