#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! File-backed settings for the flight plan synchroniser.
//!
//! Layout: `model.rs` (settings document), `validate.rs` (validation/parsing
//! helpers), `store.rs` (`FileSettingsStore`, the JSON settings file).

pub mod error;
pub mod model;
pub mod store;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::Settings;
pub use store::{CONFIG_ENV, FileSettingsStore, default_settings_path};
pub use validate::{parse_directory_assignment, validate_settings};
