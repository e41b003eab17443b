//! Client narration and backend log lines, kept side by side
//!
//! The client log is append-only and stamped at append time. The server log is
//! whatever the latest successful poll returned: each fetch replaces it
//! wholesale, so lines are never merged or deduplicated across polls.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Client,
    Server,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub source: LogSource,
    pub text: String,
}

impl LogEntry {
    pub fn client(text: &str) -> Self {
        Self {
            timestamp: Local::now(),
            source: LogSource::Client,
            text: text.to_string(),
        }
    }

    pub fn server(text: &str, fetched_at: DateTime<Local>) -> Self {
        Self {
            timestamp: fetched_at,
            source: LogSource::Server,
            text: text.to_string(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            LogSource::Client => write!(f, "{}: {}", self.timestamp.format("%H:%M:%S"), self.text),
            LogSource::Server => f.write_str(&self.text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogAggregator {
    client: Vec<LogEntry>,
    server: Vec<LogEntry>,
    server_visible: bool,
    // Sequence number of the fetch whose lines are currently shown.
    #[serde(skip)]
    applied_fetch: u64,
}

impl LogAggregator {
    pub fn push_client(&mut self, text: &str) {
        self.client.push(LogEntry::client(text));
    }

    pub fn clear_client(&mut self) {
        self.client.clear();
    }

    pub fn client(&self) -> &[LogEntry] {
        &self.client
    }

    pub fn server(&self) -> &[LogEntry] {
        &self.server
    }

    pub fn server_visible(&self) -> bool {
        self.server_visible
    }

    pub fn set_server_visible(&mut self, visible: bool) {
        self.server_visible = visible;
    }

    /// Replace the server log with the result of fetch number `seq`. Results of
    /// fetches older than the one already applied are dropped. Returns whether
    /// the lines were applied.
    pub fn replace_server(&mut self, seq: u64, lines: &[String]) -> bool {
        if seq < self.applied_fetch {
            return false;
        }

        let fetched_at = Local::now();
        self.applied_fetch = seq;
        self.server = lines
            .iter()
            .map(|line| LogEntry::server(line, fetched_at))
            .collect();
        true
    }

    /// Client entries, followed by server entries while the server log is shown
    pub fn transcript(&self) -> impl Iterator<Item = &LogEntry> {
        let server: &[LogEntry] = if self.server_visible {
            &self.server
        } else {
            &[]
        };
        self.client.iter().chain(server.iter())
    }
}
