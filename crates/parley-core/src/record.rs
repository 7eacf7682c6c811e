//! The unit of conversation history.

use serde::{Deserialize, Serialize};

/// One timestamped message.
///
/// `role` is a free-form label (`"user"`, `"assistant"`, `"status"`, ...) and is
/// never validated. `entity` is set only on records owned by an entity-scoped
/// log; it describes the record and plays no part in routing.
///
/// Wire shape: `{"role", "content", "entity"?, "timestamp"}`. An absent entity is
/// omitted on write; `"entity": null` reads back as absent. Unknown keys are
/// rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    /// Speaker role.
    pub role: String,
    /// Message text.
    pub content: String,
    /// Owning entity, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Seconds since the Unix epoch (UTC).
    pub timestamp: f64,
}

impl Record {
    /// Create an unscoped record.
    pub fn new(role: impl Into<String>, content: impl Into<String>, timestamp: f64) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            entity: None,
            timestamp,
        }
    }

    /// Tag the record with an entity.
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// The `"role: content"` line used when rendering a prompt.
    pub fn prompt_line(&self) -> String {
        format!("{}: {}", self.role, self.content)
    }
}
