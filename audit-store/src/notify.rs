//! User notifications
//!
//! Operations report their outcome through a [`Notifier`]. Delivery is fire
//! and forget; a notifier cannot fail an operation.

use std::sync::Mutex;

use serde::Serialize;

/// Notification level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Success,
    Error,
}

/// A delivered notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification {
            level: NotifyLevel::Success,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Notification {
            level: NotifyLevel::Error,
            message: message.to_string(),
        });
    }
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotifyLevel::Success => tracing::info!(text = %notification.message, "Notification"),
            NotifyLevel::Error => tracing::warn!(text = %notification.message, "Notification"),
        }
    }
}

/// Keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    recorded: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.recorded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Most recent message, if any
    pub fn last(&self) -> Option<Notification> {
        self.recorded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    pub fn clear(&self) {
        self.recorded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.recorded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.success("Added 2 finding(s).");
        notifier.error("Title is required.");

        let all = notifier.notifications();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].level, NotifyLevel::Success);
        assert_eq!(
            notifier.last(),
            Some(Notification {
                level: NotifyLevel::Error,
                message: "Title is required.".into(),
            })
        );

        notifier.clear();
        assert!(notifier.last().is_none());
    }
}
