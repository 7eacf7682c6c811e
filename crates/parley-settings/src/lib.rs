//! # parley-settings
//!
//! Configuration with layered sources.
//!
//! Settings are resolved in three layers (later wins):
//! 1. **Compiled defaults**: [`ParleySettings::default()`]
//! 2. **User file**: `~/.parley/settings.json`, deep-merged over defaults
//! 3. **Environment variables**: `PARLEY_*` overrides

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides, deep_merge, load_settings, load_settings_from_path,
    parley_dir, settings_path,
};
pub use types::{HistorySettings, LoggingSettings, ParleySettings};
