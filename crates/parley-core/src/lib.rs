//! # parley-core
//!
//! Foundation types shared by every Parley crate:
//!
//! - **Records**: [`Record`], one timestamped `(role, content)` message with an
//!   optional entity tag
//! - **Clock**: [`Clock`] trait with [`SystemClock`] and the deterministic
//!   [`ManualClock`] used in tests
//! - **Errors**: [`HistoryError`] for persistence failures
//! - **Logging**: [`logging::init_subscriber`] and log capture for tests

#![deny(unsafe_code)]

pub mod clock;
pub mod errors;
pub mod logging;
pub mod record;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use errors::{HistoryError, Result};
pub use record::Record;

/// Number of records rendered when no limit is given.
pub const DEFAULT_RECENT_LIMIT: usize = 5;
