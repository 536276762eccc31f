//! Append-only activity log backed by a `tokio::sync::broadcast` channel.
//!
//! [`LogStream`] is the sole observability channel of the orchestrator.
//! It keeps the full history in memory and fans out live appends to any
//! number of subscribers. Ordering is append order; timestamps are
//! informational and never used as a sort key.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

/// Default buffer capacity for the live broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

// ---------------------------------------------------------------------------
// LogEntry
// ---------------------------------------------------------------------------

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

/// One immutable entry in the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// When the entry was appended (UTC). Informational only: two
    /// entries may share a timestamp at clock granularity while still
    /// having a definite append order.
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub level: LogLevel,
}

impl LogEntry {
    fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            level,
        }
    }
}

// ---------------------------------------------------------------------------
// LogStream
// ---------------------------------------------------------------------------

/// Append-only, replayable activity log.
///
/// Designed to be shared as `Arc<LogStream>`. Appends are synchronous
/// and non-blocking; the internal mutex only guards the history vector
/// for the instant of the push.
///
/// # Usage
///
/// ```rust
/// use dbshift_events::{LogLevel, LogStream};
///
/// let log = LogStream::default();
/// log.info("Starting database migration...");
///
/// let (history, _live) = log.subscribe();
/// assert_eq!(history.len(), 1);
/// assert_eq!(history[0].level, LogLevel::Info);
/// ```
pub struct LogStream {
    history: Mutex<Vec<LogEntry>>,
    sender: broadcast::Sender<LogEntry>,
}

impl LogStream {
    /// Create a stream with a specific live-channel capacity.
    ///
    /// A slow subscriber whose buffer overflows observes
    /// `RecvError::Lagged`; the history vector is never truncated, so a
    /// lagged subscriber can re-subscribe and replay from the start.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            history: Mutex::new(Vec::new()),
            sender,
        }
    }

    /// Append an entry and fan it out to live subscribers.
    pub fn append(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);
        // Push and send under the same lock so subscribers created
        // concurrently cannot see the entry in both the replay and the
        // live channel, or in neither.
        let mut history = self.history.lock().expect("log history lock poisoned");
        history.push(entry.clone());
        // A SendError only means there are zero live receivers.
        let _ = self.sender.send(entry);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.append(LogLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.append(LogLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.append(LogLevel::Error, message);
    }

    /// Subscribe with replay-from-start semantics.
    ///
    /// Returns the full history as of the subscription instant plus a
    /// live receiver for everything appended after it. The two never
    /// overlap and have no gap between them.
    pub fn subscribe(&self) -> (Vec<LogEntry>, broadcast::Receiver<LogEntry>) {
        let history = self.history.lock().expect("log history lock poisoned");
        (history.clone(), self.sender.subscribe())
    }

    /// Snapshot of all entries appended so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.history.lock().expect("log history lock poisoned").clone()
    }

    /// Number of entries appended so far.
    pub fn len(&self) -> usize {
        self.history.lock().expect("log history lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convenience view of the history as plain messages, in append order.
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }
}

impl Default for LogStream {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order() {
        let log = LogStream::default();
        log.info("first");
        log.success("second");
        log.error("third");

        assert_eq!(log.messages(), vec!["first", "second", "third"]);
        let entries = log.entries();
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[1].level, LogLevel::Success);
        assert_eq!(entries[2].level, LogLevel::Error);
    }

    #[tokio::test]
    async fn subscribe_replays_history_then_delivers_live() {
        let log = LogStream::default();
        log.info("before subscribe");

        let (history, mut live) = log.subscribe();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message, "before subscribe");

        log.success("after subscribe");
        let entry = live.recv().await.expect("live entry");
        assert_eq!(entry.message, "after subscribe");
        assert_eq!(entry.level, LogLevel::Success);
    }

    #[tokio::test]
    async fn multiple_subscribers_see_every_append() {
        let log = LogStream::default();
        let (_, mut rx1) = log.subscribe();
        let (_, mut rx2) = log.subscribe();

        log.info("broadcast");

        assert_eq!(rx1.recv().await.unwrap().message, "broadcast");
        assert_eq!(rx2.recv().await.unwrap().message, "broadcast");
    }

    #[test]
    fn append_with_no_subscribers_does_not_panic() {
        let log = LogStream::default();
        log.error("orphan entry");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn empty_stream_reports_empty() {
        let log = LogStream::default();
        assert!(log.is_empty());
        log.info("x");
        assert!(!log.is_empty());
    }

    #[test]
    fn entry_serializes_with_lowercase_level() {
        let log = LogStream::default();
        log.success("done");
        let json = serde_json::to_value(&log.entries()[0]).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["message"], "done");
        assert!(json["timestamp"].is_string());
    }
}
