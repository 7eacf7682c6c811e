//! Settings type definitions.
//!
//! Field names are camelCase on the wire. Every section is `#[serde(default)]`
//! so a partial file only overrides what it names.

use std::path::PathBuf;

use parley_core::DEFAULT_RECENT_LIMIT;
use parley_core::logging::DEFAULT_LEVEL;
use serde::{Deserialize, Serialize};

use crate::loader::parley_dir;

/// Root settings type.
///
/// ```json
/// {
///   "history": { "messageLog": "/data/chat.jsonl", "recentLimit": 10 },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParleySettings {
    /// Where histories live and how much of them to render.
    pub history: HistorySettings,
    /// Log output.
    pub logging: LoggingSettings,
}

/// History file locations and rendering defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistorySettings {
    /// Single-stream history file.
    pub message_log: PathBuf,
    /// Per-entity history file.
    pub entity_log: PathBuf,
    /// Records rendered when no limit is given.
    pub recent_limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        let dir = parley_dir();
        Self {
            message_log: dir.join("memory.jsonl"),
            entity_log: dir.join("entities.jsonl"),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
        }
    }
}
