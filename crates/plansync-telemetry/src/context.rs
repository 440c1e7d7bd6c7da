//! Span helpers for command execution.

use tracing::Span;

use crate::init::build_sha;

/// Span covering one CLI command, tagged with its trace id and the build SHA.
#[must_use]
pub fn run_span(command: &str, trace_id: &str) -> Span {
    tracing::info_span!(
        "plansync",
        command = %command,
        trace_id = %trace_id,
        build_sha = %build_sha()
    )
}
