//! Per-run log collector.
//!
//! A `RunLog` is created at the start of each migration or rollback and passed
//! by `&mut` through every step, so concurrent runs never share log state.
//! Entries are mirrored to `tracing` as they are recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RefactorError, RunFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug)]
pub struct RunLog {
    run: &'static str,
    entries: Vec<LogEntry>,
}

impl RunLog {
    /// `run` names the run kind ("migration", "rollback") in tracing output.
    pub fn new(run: &'static str) -> Self {
        Self {
            run,
            entries: Vec::new(),
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into(), None);
    }

    pub fn info_with(&mut self, message: impl Into<String>, data: Value) {
        self.push(LogLevel::Info, message.into(), Some(data));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warning, message.into(), None);
    }

    pub fn warning_with(&mut self, message: impl Into<String>, data: Value) {
        self.push(LogLevel::Warning, message.into(), Some(data));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into(), None);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Success, message.into(), None);
    }

    pub fn success_with(&mut self, message: impl Into<String>, data: Value) {
        self.push(LogLevel::Success, message.into(), Some(data));
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    /// Records `error` and closes the log into a [`RunFailure`].
    pub fn fail(mut self, error: RefactorError) -> RunFailure {
        self.error(error.to_string());
        RunFailure {
            error,
            logs: self.entries,
        }
    }

    fn push(&mut self, level: LogLevel, message: String, data: Option<Value>) {
        let run = self.run;
        match level {
            LogLevel::Info => tracing::info!(run, "{message}"),
            LogLevel::Success => tracing::info!(run, outcome = "success", "{message}"),
            LogLevel::Warning => tracing::warn!(run, "{message}"),
            LogLevel::Error => tracing::error!(run, "{message}"),
        }

        self.entries.push(LogEntry {
            timestamp: Utc::now(),
            level,
            message,
            data,
        });
    }
}
