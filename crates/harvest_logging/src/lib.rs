#![deny(missing_docs)]
//! Shared logging utilities for the harvester workspace.
//!
//! This crate provides the `harvest_*` logging macros used across the codebase,
//! the per-call [`SessionTag`] that prefixes harvest log lines, and a minimal
//! test initializer for the global logger.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[doc(hidden)]
pub use log;

/// Target every `harvest_*` macro logs under.
pub const TARGET: &str = "harvest";

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Identifies the log lines of one `collect` invocation.
///
/// Ids are process-wide and strictly increasing, so two sessions never share a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionTag(u64);

impl SessionTag {
    /// Allocates the next tag.
    pub fn next() -> Self {
        Self(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric id of this tag.
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collect#{}", self.0)
    }
}

/// Logs a trace-level message under the harvest target.
#[macro_export]
macro_rules! harvest_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs a debug-level message under the harvest target.
#[macro_export]
macro_rules! harvest_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs an info-level message under the harvest target.
#[macro_export]
macro_rules! harvest_info {
    ($($arg:tt)*) => {{
        $crate::log::info!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs a warn-level message under the harvest target.
#[macro_export]
macro_rules! harvest_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs an error-level message under the harvest target.
#[macro_export]
macro_rules! harvest_error {
    ($($arg:tt)*) => {{
        $crate::log::error!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Reads a level filter from the `HARVEST_LOG` environment variable.
///
/// Accepts the usual `log` names (`off`, `error`, `warn`, `info`, `debug`, `trace`),
/// case-insensitively. Returns `None` when unset or unparseable.
pub fn level_from_env() -> Option<log::LevelFilter> {
    std::env::var("HARVEST_LOG")
        .ok()
        .and_then(|raw| raw.trim().parse::<log::LevelFilter>().ok())
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let default_level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let level = level_from_env().unwrap_or(default_level);

    // Another test may already own the global logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tags_are_unique_and_increasing() {
        let first = SessionTag::next();
        let second = SessionTag::next();
        assert!(second.id() > first.id());
        assert_eq!(format!("{first}"), format!("collect#{}", first.id()));
    }
}
