//! # parley-script
//!
//! Pulls `(entity, role, content)` interactions out of free-form script text.
//!
//! Each line is expected to look like `Entity (role): content`:
//!
//! ```text
//! Alice (user): Hello Bob
//! Bob (assistant): Hi Alice
//! Narrator (system): The room is quiet.
//! ```
//!
//! Extraction is best-effort and single-pass. Lines that do not fit the shape,
//! or whose content is blank, are skipped without any diagnostic; that is the
//! normal outcome for prose mixed into a script, not an error.
//!
//! [`InteractionParser`] is the seam for swapping in a different extractor
//! (for example one backed by a language model); [`PatternParser`] is the
//! built-in regex implementation.

#![deny(unsafe_code)]

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `Entity (role): content`, with whitespace allowed around each part.
static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<entity>[^():\n]+)\s*\((?P<role>[^)]+)\)\s*:\s*(?P<content>.+?)\s*$")
        .expect("interaction pattern is valid")
});

/// Line boundaries: `\n`, `\r`, vertical tab, form feed, the file/group/record
/// separators, NEL, and the Unicode line and paragraph separators.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b'..='\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split `text` on every [`is_line_break`], treating `\r\n` as one break.
fn script_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let text = rest?;
        let Some(at) = text.find(is_line_break) else {
            rest = None;
            return Some(text);
        };
        let tail = &text[at..];
        let width = if tail.starts_with("\r\n") {
            2
        } else {
            tail.chars().next().map_or(1, char::len_utf8)
        };
        rest = Some(&tail[width..]);
        Some(&text[..at])
    })
}

/// One extracted line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Who or what the line belongs to.
    pub entity: String,
    /// Role label from the parentheses.
    pub role: String,
    /// Text after the colon.
    pub content: String,
}

impl Interaction {
    /// Split into an `(entity, role, content)` triple.
    pub fn into_parts(self) -> (String, String, String) {
        (self.entity, self.role, self.content)
    }
}

/// Turns script text into interactions.
pub trait InteractionParser {
    /// Extract interactions in input order.
    fn parse(&self, text: &str) -> Vec<Interaction>;
}

/// Line-by-line regex extractor.
#[derive(Clone, Copy, Debug, Default)]
pub struct PatternParser;

impl InteractionParser for PatternParser {
    fn parse(&self, text: &str) -> Vec<Interaction> {
        script_lines(text).filter_map(parse_line).collect()
    }
}

/// Extract every `Entity (role): content` line from `text`, in order.
pub fn parse_interactions(text: &str) -> Vec<Interaction> {
    PatternParser.parse(text)
}

/// Parse one line; `None` when it does not match or its content is blank.
pub fn parse_line(line: &str) -> Option<Interaction> {
    let caps = LINE_RE.captures(line)?;
    let content = caps["content"].trim();
    if content.is_empty() {
        return None;
    }
    Some(Interaction {
        entity: caps["entity"].trim().to_owned(),
        role: caps["role"].trim().to_owned(),
        content: content.to_owned(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
