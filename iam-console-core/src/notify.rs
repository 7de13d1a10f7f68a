//! User-facing notifications
//!
//! Controllers report every outcome the user should see (success toasts, backend
//! rejections) through a [`Notifier`]. Validation failures are not notified; they
//! are attached to the form instead.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::error::ConsoleError;

/// Fixed success texts.
pub mod messages {
    pub const CREATE_SUCCESS: &str = "Created successfully";
    pub const SAVE_SUCCESS: &str = "Saved successfully";
    pub const DELETE_SUCCESS: &str = "Deleted successfully";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for user-visible messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success | NotificationLevel::Info => {
                log::info!("{}", notification.message);
            }
            NotificationLevel::Error => log::warn!("{}", notification.message),
        }
    }
}

/// Keeps every notification in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    entries: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages only, in order.
    pub fn messages(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Drain the recorded notifications.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

/// Log a failed action by severity and surface its message to the user.
pub(crate) fn report_failure(
    notifier: &dyn Notifier,
    collection: &str,
    action: &str,
    error: &ConsoleError,
) {
    if error.is_expected() {
        log::warn!("[{collection}] {action} failed: {error}");
    } else {
        log::error!("[{collection}] {action} failed: {error}");
    }
    notifier.notify(Notification::error(error.user_message()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use iam_console_gateway::GatewayError;

    #[test]
    fn recording_keeps_order_and_drains() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::success(messages::CREATE_SUCCESS));
        notifier.notify(Notification::error("boom"));
        assert_eq!(notifier.messages(), ["Created successfully", "boom"]);
        assert_eq!(notifier.last().map(|n| n.level), Some(NotificationLevel::Error));
        assert_eq!(notifier.take().len(), 2);
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn failures_surface_backend_text() {
        let notifier = RecordingNotifier::new();
        let error = ConsoleError::from(GatewayError::Rejected {
            collection: "mail-templates".to_string(),
            code: None,
            message: "template code already exists".to_string(),
        });
        report_failure(&notifier, "mail-templates", "create", &error);
        assert_eq!(
            notifier.last(),
            Some(Notification::error("template code already exists"))
        );
    }
}
