//! Conversation histories keyed by entity.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use parley_core::{Record, Result, SharedClock, SystemClock};
use tracing::debug;

use crate::message_log::MessageLog;
use crate::stream::{EntityLine, OwnedEntityLine, read_lines, write_lines};

/// Independent [`MessageLog`]s keyed by entity identifier.
///
/// A sub-log is created on the first write naming an entity and is never
/// removed. Reads never create sub-logs: an unknown entity simply has no
/// history. Iteration and persistence follow first-seen entity order.
#[derive(Clone, Debug)]
pub struct EntityLog {
    logs: IndexMap<String, MessageLog>,
    clock: SharedClock,
}

impl Default for EntityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityLog {
    /// Empty mapping stamped by the wall clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock::shared())
    }

    /// Empty mapping whose sub-logs share `clock`.
    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            logs: IndexMap::new(),
            clock,
        }
    }

    /// Get or create the sub-log for `entity`.
    fn log_mut(&mut self, entity: String) -> &mut MessageLog {
        let clock = &self.clock;
        self.logs
            .entry(entity)
            .or_insert_with(|| MessageLog::with_clock(Arc::clone(clock)))
    }

    // ── Mutation ────────────────────────────────────────────────────

    /// Append a record for `entity`, creating its log if needed.
    pub fn append(
        &mut self,
        entity: impl Into<String>,
        role: impl Into<String>,
        content: impl Into<String>,
    ) {
        let entity = entity.into();
        self.log_mut(entity.clone()).append_tagged(role, content, entity);
    }

    /// Append every `(entity, role, content)` triple in order.
    pub fn append_all<I, E, R, C>(&mut self, interactions: I)
    where
        I: IntoIterator<Item = (E, R, C)>,
        E: Into<String>,
        R: Into<String>,
        C: Into<String>,
    {
        for (entity, role, content) in interactions {
            self.append(entity, role, content);
        }
    }

    // ── Access ──────────────────────────────────────────────────────

    /// The last `limit` records for `entity`; empty for an unknown entity.
    pub fn recent(&self, entity: &str, limit: usize) -> &[Record] {
        match self.logs.get(entity) {
            Some(log) => log.recent(limit),
            None => &[],
        }
    }

    /// Render `entity`'s last `limit` records; `""` for an unknown entity.
    pub fn render(&self, entity: &str, limit: usize) -> String {
        self.logs
            .get(entity)
            .map(|log| log.render(limit))
            .unwrap_or_default()
    }

    /// The sub-log for `entity`, if it has ever been written.
    pub fn get(&self, entity: &str) -> Option<&MessageLog> {
        self.logs.get(entity)
    }

    /// Whether `entity` has a sub-log.
    pub fn contains(&self, entity: &str) -> bool {
        self.logs.contains_key(entity)
    }

    /// Entity identifiers in first-seen order.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.logs.keys().map(String::as_str)
    }

    /// `(entity, log)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MessageLog)> {
        self.logs.iter().map(|(entity, log)| (entity.as_str(), log))
    }

    /// Number of sub-logs.
    pub fn entity_count(&self) -> usize {
        self.logs.len()
    }

    /// Total records across all entities.
    pub fn len(&self) -> usize {
        self.logs.values().map(MessageLog::len).sum()
    }

    /// Whether no entity has been written.
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Overwrite `path` with every record, grouped by entity.
    ///
    /// Each line carries `entity`, `role`, `content` and `timestamp`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let lines = self.logs.iter().flat_map(|(entity, log)| {
            log.iter().map(move |record| EntityLine {
                entity: entity.as_str(),
                role: record.role.as_str(),
                content: record.content.as_str(),
                timestamp: record.timestamp,
            })
        });
        let written = write_lines(path, lines)?;
        debug!(
            path = %path.display(),
            entities = self.logs.len(),
            records = written,
            "saved entity log"
        );
        Ok(())
    }

    /// Load a mapping from `path`, stamping later appends with the wall clock.
    ///
    /// A missing file yields an empty mapping.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_clock(path, SystemClock::shared())
    }

    /// Load a mapping from `path`, stamping later appends with `clock`.
    ///
    /// Every line must name its entity. Stored timestamps are kept verbatim.
    pub fn load_with_clock(path: impl AsRef<Path>, clock: SharedClock) -> Result<Self> {
        let path = path.as_ref();
        let mut mapping = Self::with_clock(clock);
        let Some(lines) = read_lines::<OwnedEntityLine>(path)? else {
            debug!(path = %path.display(), "entity log not found, starting empty");
            return Ok(mapping);
        };

        for line in lines {
            let (entity, record) = line.into_record();
            mapping.log_mut(entity).push(record);
        }
        debug!(
            path = %path.display(),
            entities = mapping.logs.len(),
            records = mapping.len(),
            "loaded entity log"
        );
        Ok(mapping)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
