//! Time sources for stamping records.
//!
//! Logs never read the system clock directly; they hold a [`SharedClock`] so
//! tests can supply deterministic timestamps.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

/// Source of the current time, in seconds since the Unix epoch (UTC).
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in fractional seconds.
    fn now(&self) -> f64;
}

/// Clock handle shared between a log and its sub-logs.
pub type SharedClock = Arc<dyn Clock>;

/// Wall clock backed by [`chrono::Utc`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    /// A [`SharedClock`] reading the wall clock.
    pub fn shared() -> SharedClock {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    #[allow(clippy::cast_precision_loss)]
    fn now(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Deterministic clock: returns `start`, then advances by `step` on every read.
#[derive(Debug)]
pub struct ManualClock {
    next: Mutex<f64>,
    step: f64,
}

impl ManualClock {
    /// Clock starting at `start` that advances `step` seconds per reading.
    pub fn new(start: f64, step: f64) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }

    /// Clock that always reads `at`.
    pub fn frozen(at: f64) -> Self {
        Self::new(at, 0.0)
    }

    /// Move the next reading to `at`.
    pub fn set(&self, at: f64) {
        *self.next.lock() = at;
    }

    /// Wrap into a [`SharedClock`].
    pub fn shared(self) -> SharedClock {
        Arc::new(self)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        let mut next = self.next.lock();
        let current = *next;
        *next += self.step;
        current
    }
}
