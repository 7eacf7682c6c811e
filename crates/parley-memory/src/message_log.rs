//! A single ordered conversation history.

use std::path::Path;

use parley_core::{Record, Result, SharedClock, SystemClock};
use tracing::debug;

use crate::stream::{read_lines, write_lines};

/// Ordered, append-only sequence of [`Record`]s.
///
/// Order is insertion order and is never re-sorted. Every appended record is
/// stamped from the log's clock; a reading earlier than the previous record is
/// raised to it, so timestamps never decrease within one log.
#[derive(Clone, Debug)]
pub struct MessageLog {
    records: Vec<Record>,
    clock: SharedClock,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLog {
    /// Empty log stamped by the wall clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock::shared())
    }

    /// Empty log stamped by `clock`.
    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            records: Vec::new(),
            clock,
        }
    }

    // ── Mutation ────────────────────────────────────────────────────

    /// Append an unscoped record stamped with the current time.
    pub fn append(&mut self, role: impl Into<String>, content: impl Into<String>) {
        let record = Record::new(role, content, self.next_timestamp());
        self.records.push(record);
    }

    /// Append a record tagged with `entity`, stamped with the current time.
    pub fn append_tagged(
        &mut self,
        role: impl Into<String>,
        content: impl Into<String>,
        entity: impl Into<String>,
    ) {
        let record = Record::new(role, content, self.next_timestamp()).with_entity(entity);
        self.records.push(record);
    }

    /// Append an already-stamped record as is.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    fn next_timestamp(&self) -> f64 {
        let now = self.clock.now();
        match self.records.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }

    // ── Access ──────────────────────────────────────────────────────

    /// The last `limit` records, oldest first.
    ///
    /// A zero limit selects nothing; a limit past the length selects the whole
    /// log.
    pub fn recent(&self, limit: usize) -> &[Record] {
        let start = self.records.len().saturating_sub(limit);
        &self.records[start..]
    }

    /// The last `limit` records as `"role: content"` lines joined by `\n`.
    ///
    /// No trailing newline; an empty selection renders as `""`.
    pub fn render(&self, limit: usize) -> String {
        self.recent(limit)
            .iter()
            .map(Record::prompt_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Most recently appended record.
    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Overwrite `path` with every record, one JSON object per line.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let written = write_lines(path, &self.records)?;
        debug!(path = %path.display(), records = written, "saved message log");
        Ok(())
    }

    /// Load a log from `path`, stamping later appends with the wall clock.
    ///
    /// A missing file yields an empty log.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_clock(path, SystemClock::shared())
    }

    /// Load a log from `path`, stamping later appends with `clock`.
    ///
    /// Stored timestamps are kept verbatim.
    pub fn load_with_clock(path: impl AsRef<Path>, clock: SharedClock) -> Result<Self> {
        let path = path.as_ref();
        let mut log = Self::with_clock(clock);
        match read_lines::<Record>(path)? {
            Some(records) => {
                debug!(path = %path.display(), records = records.len(), "loaded message log");
                log.records = records;
            }
            None => debug!(path = %path.display(), "message log not found, starting empty"),
        }
        Ok(log)
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use parley_core::logging::capture_logs;
    use parley_core::{HistoryError, ManualClock};

    fn stepping_log() -> MessageLog {
        MessageLog::with_clock(ManualClock::new(1_700_000_000.0, 1.0).shared())
    }

    #[test]
    fn add_and_render() {
        let mut log = stepping_log();
        log.append("user", "Hi");
        log.append("assistant", "Hello");
        assert_eq!(log.len(), 2);
        assert_eq!(log.render(5), "user: Hi\nassistant: Hello");
    }

    #[test]
    fn recent_returns_suffix_in_order() {
        let mut log = stepping_log();
        for i in 0..6 {
            log.append("user", format!("m{i}"));
        }
        let contents: Vec<_> = log.recent(3).iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["m3", "m4", "m5"]);
    }

    #[test]
    fn recent_zero_is_empty() {
        let mut log = stepping_log();
        log.append("user", "Hi");
        assert!(log.recent(0).is_empty());
        assert_eq!(log.render(0), "");
    }

    #[test]
    fn recent_past_length_returns_everything() {
        let mut log = stepping_log();
        log.append("user", "a");
        log.append("user", "b");
        assert_eq!(log.recent(100).len(), 2);
        assert_eq!(log.recent(usize::MAX).len(), 2);
    }

    #[test]
    fn empty_log_renders_empty_string() {
        let log = stepping_log();
        assert_eq!(log.render(5), "");
        assert!(log.is_empty());
        assert!(log.last().is_none());
    }

    #[test]
    fn empty_role_and_content_are_accepted() {
        let mut log = stepping_log();
        log.append("", "");
        assert_eq!(log.render(1), ": ");
    }

    #[test]
    fn append_stamps_from_clock() {
        let mut log = MessageLog::with_clock(ManualClock::new(10.0, 2.5).shared());
        log.append("user", "a");
        log.append("user", "b");
        let stamps: Vec<_> = log.iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, [10.0, 12.5]);
    }

    #[test]
    fn timestamps_never_decrease() {
        let clock = std::sync::Arc::new(ManualClock::new(50.0, 0.0));
        let mut log = MessageLog::with_clock(clock.clone());
        log.append("user", "a");
        clock.set(20.0);
        log.append("user", "b");
        assert_eq!(log.records()[1].timestamp, 50.0);
    }

    #[test]
    fn append_tagged_sets_entity() {
        let mut log = stepping_log();
        log.append_tagged("user", "Hi", "hero");
        assert_eq!(log.last().unwrap().entity.as_deref(), Some("hero"));
    }

    #[test]
    fn push_keeps_timestamp() {
        let mut log = stepping_log();
        log.push(Record::new("user", "old", 5.0));
        assert_eq!(log.records()[0].timestamp, 5.0);
    }

    #[test]
    fn iterates_in_insertion_order() {
        let mut log = stepping_log();
        log.append("a", "1");
        log.append("b", "2");
        let roles: Vec<_> = (&log).into_iter().map(|r| r.role.clone()).collect();
        assert_eq!(roles, ["a", "b"]);
    }

    #[test]
    fn persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mem.jsonl");
        let mut log = stepping_log();
        log.append("user", "Hello");
        log.append_tagged("npc", "Greetings", "Guard");
        log.save(&path).unwrap();

        let loaded = MessageLog::load(&path).unwrap();
        assert_eq!(loaded.records(), log.records());
        assert_eq!(loaded.render(5), "user: Hello\nnpc: Greetings");
    }

    #[test]
    fn saved_lines_match_wire_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mem.jsonl");
        let mut log = MessageLog::with_clock(ManualClock::frozen(1.5).shared());
        log.append("user", "Hi");
        log.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\"role\":\"user\",\"content\":\"Hi\",\"timestamp\":1.5}\n");
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mem.jsonl");
        let mut big = stepping_log();
        for i in 0..4 {
            big.append("user", i.to_string());
        }
        big.save(&path).unwrap();

        let mut small = stepping_log();
        small.append("user", "only");
        small.save(&path).unwrap();

        assert_eq!(MessageLog::load(&path).unwrap().len(), 1);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (logs, _guard) = capture_logs();
        let log = MessageLog::load(dir.path().join("absent.jsonl")).unwrap();
        assert!(log.is_empty());
        assert!(logs.has_event(tracing::Level::DEBUG, "not found"));
        assert_eq!(logs.count_at_least(tracing::Level::WARN), 0);
    }

    #[test]
    fn load_rejects_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mem.jsonl");
        std::fs::write(
            &path,
            "{\"role\":\"user\",\"content\":\"a\",\"timestamp\":1.0}\n{\"role\":\"user\",\"timestamp\":2.0}\n",
        )
        .unwrap();
        let err = MessageLog::load(&path).unwrap_err();
        assert_matches!(err, HistoryError::Malformed { line: 2, .. });
    }

    #[test]
    fn load_accepts_entity_stream_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mem.jsonl");
        std::fs::write(
            &path,
            "{\"entity\":\"hero\",\"role\":\"user\",\"content\":\"Hi\",\"timestamp\":1.0}\n",
        )
        .unwrap();
        let log = MessageLog::load(&path).unwrap();
        assert_eq!(log.records()[0].entity.as_deref(), Some("hero"));
    }

    #[test]
    fn appends_after_load_continue_from_stored_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mem.jsonl");
        let mut log = MessageLog::with_clock(ManualClock::frozen(900.0).shared());
        log.append("user", "late");
        log.save(&path).unwrap();

        let mut loaded =
            MessageLog::load_with_clock(&path, ManualClock::frozen(100.0).shared()).unwrap();
        loaded.append("user", "next");
        assert_eq!(loaded.records()[1].timestamp, 900.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn build(contents: &[String]) -> MessageLog {
            let mut log = MessageLog::with_clock(ManualClock::new(0.0, 0.25).shared());
            for content in contents {
                log.append("user", content.clone());
            }
            log
        }

        proptest! {
            #[test]
            fn recent_is_bounded_suffix(
                contents in proptest::collection::vec(".*", 0..20),
                limit in 0usize..30,
            ) {
                let log = build(&contents);
                let selected = log.recent(limit);
                let expected = limit.min(contents.len());
                prop_assert_eq!(selected.len(), expected);
                let tail = &contents[contents.len() - expected..];
                for (record, content) in selected.iter().zip(tail) {
                    prop_assert_eq!(&record.content, content);
                }
            }

            #[test]
            fn render_joins_recent_lines(
                contents in proptest::collection::vec("[a-z ]{0,8}", 0..10),
                limit in 0usize..12,
            ) {
                let log = build(&contents);
                let expected = log
                    .recent(limit)
                    .iter()
                    .map(|r| format!("user: {}", r.content))
                    .collect::<Vec<_>>()
                    .join("\n");
                prop_assert_eq!(log.render(limit), expected);
            }

            #[test]
            fn save_load_is_lossless(
                entries in proptest::collection::vec(
                    (".*", ".*", proptest::option::of("[A-Za-z ]{1,10}")),
                    0..12,
                ),
            ) {
                let dir = tempfile::tempdir().unwrap();
                let path = dir.path().join("mem.jsonl");
                let clock = ManualClock::new(1_700_000_000.125, 0.001).shared();
                let mut log = MessageLog::with_clock(clock);
                for (role, content, entity) in &entries {
                    match entity {
                        Some(entity) => {
                            log.append_tagged(role.clone(), content.clone(), entity.clone());
                        }
                        None => log.append(role.clone(), content.clone()),
                    }
                }
                log.save(&path).unwrap();
                let loaded = MessageLog::load(&path).unwrap();
                prop_assert_eq!(loaded.records(), log.records());
            }
        }
    }
}
