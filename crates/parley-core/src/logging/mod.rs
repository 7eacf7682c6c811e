//! Structured logging with `tracing`.
//!
//! Library crates only emit events; binaries call [`init_subscriber`] once at
//! startup. [`capture_logs`] installs a thread-local collector for tests.

pub mod test_utils;

pub use test_utils::{CapturedEvent, CapturedLogs, capture_logs};

/// Default filter when neither settings nor `RUST_LOG` say otherwise.
pub const DEFAULT_LEVEL: &str = "warn";

/// Initialize the global tracing subscriber, writing compact lines to stderr.
///
/// `RUST_LOG` takes precedence over `level`. Subsequent calls are no-ops.
pub fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_subscriber_is_idempotent() {
        init_subscriber(DEFAULT_LEVEL);
        init_subscriber("debug");
    }
}
