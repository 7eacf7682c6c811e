//! Settings loading with deep merge and environment variable overrides.
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::ParleySettings;

/// Env var naming the single-stream history file.
pub const ENV_MESSAGE_LOG: &str = "PARLEY_MESSAGE_LOG";
/// Env var naming the per-entity history file.
pub const ENV_ENTITY_LOG: &str = "PARLEY_ENTITY_LOG";
/// Env var overriding the default render limit.
pub const ENV_RECENT_LIMIT: &str = "PARLEY_RECENT_LIMIT";
/// Env var overriding the log filter.
pub const ENV_LOG_LEVEL: &str = "PARLEY_LOG_LEVEL";

const MAX_RECENT_LIMIT: usize = 10_000;

/// Parley's home directory (`~/.parley`).
pub fn parley_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".parley")
}

/// Path to the settings file (`~/.parley/settings.json`).
pub fn settings_path() -> PathBuf {
    parley_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ParleySettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from `path` with env var overrides.
///
/// A missing file yields defaults; invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ParleySettings> {
    let mut settings = read_file_layer(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

fn read_file_layer(path: &Path) -> Result<ParleySettings> {
    let defaults = serde_json::to_value(ParleySettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `PARLEY_*` environment overrides.
pub fn apply_env_overrides(settings: &mut ParleySettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// Empty values are ignored. An out-of-range or unparsable recent limit is
/// ignored with a warning.
pub fn apply_overrides(settings: &mut ParleySettings, lookup: impl Fn(&str) -> Option<String>) {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(v) = read(ENV_MESSAGE_LOG) {
        settings.history.message_log = PathBuf::from(v);
    }
    if let Some(v) = read(ENV_ENTITY_LOG) {
        settings.history.entity_log = PathBuf::from(v);
    }
    if let Some(v) = read(ENV_RECENT_LIMIT) {
        match parse_usize_range(&v, 1, MAX_RECENT_LIMIT) {
            Some(limit) => settings.history.recent_limit = limit,
            None => warn!(key = ENV_RECENT_LIMIT, value = %v, "invalid recent limit, ignoring"),
        }
    }
    if let Some(v) = read(ENV_LOG_LEVEL) {
        settings.logging.level = v;
    }
}

/// Parse a `usize` within `min..=max`.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
