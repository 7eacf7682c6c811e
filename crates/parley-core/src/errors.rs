//! History persistence errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while saving or loading a history stream.
///
/// Loading is all-or-nothing: the first bad line aborts the load and nothing
/// read so far is returned.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Reading or writing the stream failed.
    #[error("history I/O error at {}: {source}", .path.display())]
    Io {
        /// Stream path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A line could not be decoded into a record.
    #[error("malformed history entry at {}:{line}: {source}", .path.display())]
    Malformed {
        /// Stream path.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded.
    #[error("failed to encode history entry: {0}")]
    Encode(#[from] serde_json::Error),
}

impl HistoryError {
    /// Wrap an I/O error with the stream path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Malformed { .. } => "malformed",
            Self::Encode(_) => "encode",
        }
    }
}

/// Result type for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
