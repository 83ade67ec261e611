//! Append-only operator log for the current session

use std::collections::VecDeque;

use chrono::Local;

/// How many log lines are retained before the oldest is evicted
pub const LOG_CAPACITY: usize = 50;

/// Severity of an operator log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

/// One human-readable status line
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Wall-clock time the line was recorded (HH:MM:SS)
    pub timestamp: String,
    pub message: String,
    pub level: LogLevel,
}

/// Bounded newest-first session log.
///
/// Every mutating operation emits exactly one line; entries are mirrored to
/// the `log` facade so they also reach the standard logger.
#[derive(Debug, Default)]
pub struct OperatorLog {
    entries: VecDeque<LogEntry>,
}

impl OperatorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a status line, evicting the oldest entry past capacity
    pub fn record(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info | LogLevel::Success => log::info!("{}", message),
            LogLevel::Error => log::error!("{}", message),
        }
        self.entries.push_front(LogEntry {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            message,
            level,
        });
        self.entries.truncate(LOG_CAPACITY);
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
