//! Line-delimited JSON codec shared by both logs.

use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use parley_core::{HistoryError, Record, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Outgoing entity stream line, borrowing from the owning log.
#[derive(Serialize)]
pub(crate) struct EntityLine<'a> {
    pub entity: &'a str,
    pub role: &'a str,
    pub content: &'a str,
    pub timestamp: f64,
}

/// Incoming entity stream line. `entity` is required here, unlike [`Record`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct OwnedEntityLine {
    pub entity: String,
    pub role: String,
    pub content: String,
    pub timestamp: f64,
}

impl OwnedEntityLine {
    /// Split into the entity key and a record tagged with it.
    pub fn into_record(self) -> (String, Record) {
        let record = Record {
            role: self.role,
            content: self.content,
            entity: Some(self.entity.clone()),
            timestamp: self.timestamp,
        };
        (self.entity, record)
    }
}

/// Truncate `path` and write one JSON object per entry, each newline-terminated.
///
/// Returns the number of lines written. The parent directory must exist.
pub(crate) fn write_lines<T, I>(path: &Path, entries: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(path).map_err(|e| HistoryError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut written = 0;

    for entry in entries {
        serde_json::to_writer(&mut writer, &entry)?;
        writer.write_all(b"\n").map_err(|e| HistoryError::io(path, e))?;
        written += 1;
    }

    writer.flush().map_err(|e| HistoryError::io(path, e))?;
    Ok(written)
}

/// Read every line of `path` as one `T`.
///
/// `Ok(None)` when the file does not exist. Any undecodable line, including a
/// blank one, fails the whole read.
pub(crate) fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(HistoryError::io(path, e)),
    };

    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let entry = serde_json::from_str(line).map_err(|source| HistoryError::Malformed {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        entries.push(entry);
    }
    Ok(Some(entries))
}
