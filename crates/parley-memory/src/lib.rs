//! # parley-memory
//!
//! In-process conversation history for prompting language models.
//!
//! - [`MessageLog`]: one ordered, append-only stream of [`Record`]s with
//!   bounded suffix retrieval ([`MessageLog::recent`]) and prompt rendering
//!   ([`MessageLog::render`]).
//! - [`EntityLog`]: independent [`MessageLog`]s keyed by entity (a character,
//!   a location, ...), created on first write.
//!
//! ## Persistence
//!
//! Both logs save to and load from line-delimited JSON, one record per line.
//! Saving always rewrites the destination. Loading a missing file yields an
//! empty log; a single malformed line fails the whole load.
//!
//! [`Record`]: parley_core::Record

#![deny(unsafe_code)]

pub mod entity_log;
pub mod message_log;
mod stream;

pub use entity_log::EntityLog;
pub use message_log::MessageLog;
