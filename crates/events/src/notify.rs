//! Advisory notification channel.
//!
//! [`Notifier`] carries short human-readable notices about terminal
//! verification/migration outcomes to any interested presentation layer.
//! Unlike the [`LogStream`](crate::log::LogStream) it keeps no history
//! and offers no delivery guarantee: it is UI sugar, not a record.

use serde::Serialize;
use tokio::sync::broadcast;

/// Default buffer capacity for the notice channel.
const DEFAULT_CAPACITY: usize = 64;

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Destructive,
}

/// One transient notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

/// Best-effort fan-out of [`Notice`]s.
pub struct Notifier {
    sender: broadcast::Sender<Notice>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit a notice. Silently dropped when nobody is subscribed.
    pub fn notify(&self, severity: Severity, message: impl Into<String>) {
        let _ = self.sender.send(Notice {
            message: message.into(),
            severity,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_notice() {
        let notifier = Notifier::default();
        let mut rx = notifier.subscribe();

        notifier.notify(Severity::Destructive, "Migration failed");

        let notice = rx.recv().await.expect("notice");
        assert_eq!(notice.severity, Severity::Destructive);
        assert_eq!(notice.message, "Migration failed");
    }

    #[test]
    fn notify_without_subscribers_does_not_panic() {
        let notifier = Notifier::default();
        notifier.notify(Severity::Info, "nobody listening");
    }
}
