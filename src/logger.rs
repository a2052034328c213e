//! Logging capability passed explicitly to every entry point.
//!
//! This module provides:
//! - [`Logger`] trait: the info/warn/error (and verbose debug) side channel
//! - [`TermLogger`]: colored `[module] message` lines on stderr (stdout is kept for JSON output)
//! - [`RecordingLogger`]: captures entries in memory for assertions
//! - `debug!`/`info!`/`warn!`/`error!` macros with `format!` arguments
//!
//! # Example
//!
//! ```ignore
//! let logger = TermLogger::new(false);
//! info!(logger, "rewrite"; "updated {} documents", count);
//! ```

use crossterm::{
    execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::io::{Write, stderr};

// ============================================================================
// Logger Trait
// ============================================================================

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Logging collaborator accepted by every pass.
///
/// Implementations must be `Sync`: the rewriter logs from rayon workers.
pub trait Logger: Sync {
    fn log(&self, level: Level, module: &str, message: &str);

    fn debug(&self, module: &str, message: &str) {
        self.log(Level::Debug, module, message);
    }

    fn info(&self, module: &str, message: &str) {
        self.log(Level::Info, module, message);
    }

    fn warn(&self, module: &str, message: &str) {
        self.log(Level::Warn, module, message);
    }

    fn error(&self, module: &str, message: &str) {
        self.log(Level::Error, module, message);
    }
}

// ============================================================================
// Log Macros
// ============================================================================

/// Log a verbose-only message
///
/// # Usage
/// ```ignore
/// debug!(logger, "module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $module:expr; $($arg:tt)*) => {{
        $crate::logger::Logger::debug($logger, $module, &format!($($arg)*))
    }};
}

/// Log an informational message
#[macro_export]
macro_rules! info {
    ($logger:expr, $module:expr; $($arg:tt)*) => {{
        $crate::logger::Logger::info($logger, $module, &format!($($arg)*))
    }};
}

/// Log a warning
#[macro_export]
macro_rules! warn {
    ($logger:expr, $module:expr; $($arg:tt)*) => {{
        $crate::logger::Logger::warn($logger, $module, &format!($($arg)*))
    }};
}

/// Log an error
#[macro_export]
macro_rules! error {
    ($logger:expr, $module:expr; $($arg:tt)*) => {{
        $crate::logger::Logger::error($logger, $module, &format!($($arg)*))
    }};
}

// ============================================================================
// Terminal Logger
// ============================================================================

/// Writes `[module] message` lines with a colored prefix.
///
/// Debug entries are only shown when constructed with `verbose = true`.
pub struct TermLogger {
    verbose: bool,
    /// Serializes writes from parallel rewriter workers.
    lock: Mutex<()>,
}

impl TermLogger {
    pub const fn new(verbose: bool) -> Self {
        Self {
            verbose,
            lock: Mutex::new(()),
        }
    }
}

impl Logger for TermLogger {
    fn log(&self, level: Level, module: &str, message: &str) {
        if level == Level::Debug && !self.verbose {
            return;
        }

        let prefix = colorize_prefix(level, module);
        let _guard = self.lock.lock();
        let mut out = stderr().lock();
        execute!(out, Clear(ClearType::UntilNewLine)).ok();
        writeln!(out, "{prefix} {message}").ok();
        out.flush().ok();
    }
}

/// Apply color to a module prefix based on severity
#[inline]
fn colorize_prefix(level: Level, module: &str) -> String {
    let prefix = format!("[{module}]");
    match level {
        Level::Debug => prefix.dimmed().to_string(),
        Level::Info => prefix.bright_yellow().bold().to_string(),
        Level::Warn => prefix.bright_magenta().bold().to_string(),
        Level::Error => prefix.bright_red().bold().to_string(),
    }
}

// ============================================================================
// Recording Logger
// ============================================================================

/// A captured log entry.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub level: Level,
    pub module: String,
    pub message: String,
}

/// Keeps every entry in memory instead of printing it.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<Entry>>,
}

#[cfg(test)]
impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries logged so far.
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().clone()
    }

    /// Entries at exactly `level`.
    pub fn at(&self, level: Level) -> Vec<Entry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
impl Logger for RecordingLogger {
    fn log(&self, level: Level, module: &str, message: &str) {
        self.entries.lock().push(Entry {
            level,
            module: module.to_string(),
            message: message.to_string(),
        });
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_logger_captures_levels() {
        let logger = RecordingLogger::new();
        info!(&logger, "scan"; "found {} references", 3);
        warn!(&logger, "scan"; "fallback for {}", "logo.png");
        error!(&logger, "copy"; "failed");

        let entries = logger.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].level, Level::Info);
        assert_eq!(entries[0].message, "found 3 references");
        assert_eq!(logger.at(Level::Warn)[0].module, "scan");
        assert_eq!(logger.at(Level::Error).len(), 1);
    }

    #[test]
    fn test_recording_logger_keeps_debug() {
        let logger = RecordingLogger::new();
        debug!(&logger, "map"; "entry {}", "a -> b");
        assert_eq!(logger.at(Level::Debug).len(), 1);
    }

    #[test]
    fn test_logger_is_object_safe() {
        let logger = RecordingLogger::new();
        let dyn_logger: &dyn Logger = &logger;
        info!(dyn_logger, "run"; "ok");
        assert_eq!(logger.entries().len(), 1);
    }
}
