//! Logging setup using `tracing` + `tracing-subscriber`
//!
//! Priority for determining the log level:
//! 1. `--verbose` flag (debug)
//! 2. `TASKDEPS_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `warn`
//!
//! Logs go to stderr so `--format json` output on stdout stays parseable.

use tracing::Level;
use tracing_subscriber::fmt;

/// Environment variable that selects the log level
pub const LOG_ENV: &str = "TASKDEPS_LOG";

/// Initialises the global subscriber
///
/// Calling it again is harmless: a second subscriber is not installed.
pub fn init(verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        std::env::var(LOG_ENV)
            .ok()
            .and_then(|s| parse_level(&s))
            .unwrap_or(Level::WARN)
    };

    let _ = fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
