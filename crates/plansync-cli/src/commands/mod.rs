//! Command handlers.

pub(crate) mod clean;
pub(crate) mod config;
pub(crate) mod sync;
