//! IAM Console Core Library
//!
//! Screen logic of the IAM administration console, independent of any renderer:
//! - List-view controller (paging, sort, filters, stale-response discard)
//! - Form/detail controller (create, edit, view, validation, single in-flight submit)
//! - Screens: system announcements, mail templates, "my projects" dashboard widget
//!
//! Remote data goes through [`RecordGateway`](iam_console_gateway::RecordGateway)
//! implementations from `iam-console-gateway`. Controllers publish immutable
//! snapshots through `tokio::sync::watch`; renderers call `snapshot()` or
//! `subscribe()`.

pub mod config;
pub mod controllers;
pub mod error;
pub mod notify;
pub mod screens;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::ConsoleConfig;
pub use controllers::{
    FormController, FormSchema, FormSnapshot, ListController, ListSnapshot, RefreshOutcome,
};
pub use error::{ConsoleError, ConsoleResult};
pub use notify::{LogNotifier, Notification, NotificationLevel, Notifier, RecordingNotifier};
pub use screens::{AnnouncementScreen, MailTemplateScreen, MyProjectsWidget, Scope};
