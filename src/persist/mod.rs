//! Persistence for templates, attempt histories, settings and suspended runs
//!
//! - `FileStore` - JSON/TOML files under one data directory
//! - `RunStore` - the subset of persistence a session depends on
//! - `SuspendedRun` - snapshot of a run closed mid-attempt
//! - `Settings` - user preferences

mod dirs;
mod settings;
mod store;
mod suspended;

pub use dirs::{default_base_dir, DATA_DIR_ENV};
pub use settings::{ColorSettings, HotkeyBindings, Settings};
pub use store::{AttemptsSummary, FileStore, RunStore, TemplateSummary};
pub use suspended::SuspendedRun;
