//! User-facing notification side channel.
//!
//! Fire-and-forget: the sequencer hands a [`Notification`] to the
//! [`Notifier`] and moves on. No acknowledgment, no delivery guarantee.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Notification severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotifySeverity {
    Info,
    Error,
}

/// A transient user-facing notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// Short headline, e.g. "Verification Complete".
    pub title: String,

    /// One-sentence body.
    pub body: String,

    /// Severity (drives presentation).
    pub severity: NotifySeverity,
}

impl Notification {
    /// Create an informational notification.
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity: NotifySeverity::Info,
        }
    }

    /// Create an error notification.
    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity: NotifySeverity::Error,
        }
    }
}

/// Notification sink. Implementations must not block and must not fail.
pub trait Notifier: Send + Sync {
    /// Deliver a notification. Fire-and-forget.
    fn notify(&self, notification: Notification);
}

/// Default sink: forwards notifications to the tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            NotifySeverity::Info => {
                info!(title = %notification.title, "{}", notification.body)
            }
            NotifySeverity::Error => {
                error!(title = %notification.title, "{}", notification.body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_constructors() {
        let ok = Notification::info("Verification Complete", "done");
        assert_eq!(ok.severity, NotifySeverity::Info);

        let bad = Notification::error("Verification Failed", "bridge failed");
        assert_eq!(bad.severity, NotifySeverity::Error);
        assert_eq!(bad.title, "Verification Failed");
    }
}
