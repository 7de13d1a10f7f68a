//! System announcements: scheduled notices sent to every user of a site or organization

use std::str::FromStr;
use std::sync::Arc;

use iam_console_gateway::{Endpoint, Record, RecordGateway};
use serde::{Deserialize, Serialize};

use super::Scope;
use crate::controllers::{FormController, FormSchema, ListController, RefreshOutcome};
use crate::error::{ConsoleError, ConsoleResult};
use crate::notify::{report_failure, Notifier};
use crate::types::{QueryChange, SelectionMode};
use crate::validation::{rich_text, Validator};

pub const COLLECTION: &str = "announcements";

/// Identifier used by the backend for delete.
pub const TASK_ID_FIELD: &str = "taskId";

/// REST layout of the announcement collection for `scope`.
pub fn endpoint(scope: &Scope) -> Endpoint {
    match scope {
        Scope::Organization { id, .. } => Endpoint::new(
            COLLECTION,
            format!("/asgard/v1/system_notice/organization/{}", urlencoding::encode(id)),
        ),
        _ => Endpoint::new(COLLECTION, "/asgard/v1/system_notice"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnouncementStatus {
    Completed,
    Sending,
    Waiting,
    Failed,
}

impl AnnouncementStatus {
    pub const ALL: [Self; 4] = [Self::Completed, Self::Sending, Self::Waiting, Self::Failed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::Sending => "SENDING",
            Self::Waiting => "WAITING",
            Self::Failed => "FAILED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Sending => "Sending",
            Self::Waiting => "Waiting",
            Self::Failed => "Failed",
        }
    }
}

impl FromStr for AnnouncementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown announcement status: {s}"))
    }
}

/// Status of a list row, if it carries a known one.
pub fn status_of(record: &Record) -> Option<AnnouncementStatus> {
    record.get_str("status").and_then(|s| s.parse().ok())
}

/// Announcement content as shown in the list.
pub fn content_preview(record: &Record) -> String {
    record
        .get_str("content")
        .map(rich_text::preview)
        .unwrap_or_default()
}

struct AnnouncementForm;

impl FormSchema for AnnouncementForm {
    fn id_field(&self) -> &str {
        TASK_ID_FIELD
    }

    fn validators(&self, _mode: SelectionMode) -> Vec<Validator> {
        vec![
            Validator::rich_content("content", "Announcement content is required"),
            Validator::timestamp("date", "Please enter the send time"),
        ]
    }

    fn content_field(&self) -> Option<&str> {
        Some("content")
    }

    fn build_body(&self, _mode: SelectionMode, fields: Record, _current: Option<&Record>) -> Record {
        let mut body = Record::new();
        if let Some(content) = fields.get("content") {
            body.insert("content", content.clone());
        }
        if let Some(date) = fields.get("date") {
            body.insert("startTime", date.clone());
        }
        body
    }
}

/// Announcement list with a create panel and a read-only detail panel.
pub struct AnnouncementScreen {
    list: Arc<ListController>,
    form: FormController,
    notifier: Arc<dyn Notifier>,
}

impl AnnouncementScreen {
    pub fn new(
        gateway: Arc<dyn RecordGateway>,
        notifier: Arc<dyn Notifier>,
        page_size: u32,
    ) -> Self {
        let list = Arc::new(ListController::new(
            gateway.clone(),
            notifier.clone(),
            page_size,
        ));
        let form = FormController::new(
            gateway,
            list.clone(),
            notifier.clone(),
            Arc::new(AnnouncementForm),
        );
        Self {
            list,
            form,
            notifier,
        }
    }

    pub fn list(&self) -> &ListController {
        &self.list
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub async fn mount(&self) -> ConsoleResult<RefreshOutcome> {
        self.form.teardown();
        self.list.initialize().await
    }

    pub fn unmount(&self) {
        self.list.teardown();
        self.form.teardown();
    }

    pub async fn change_query(&self, change: QueryChange) -> ConsoleResult<RefreshOutcome> {
        self.list.change_query(change).await
    }

    /// Show only announcements in one of `statuses`; empty clears the filter.
    pub async fn filter_by_status(
        &self,
        statuses: &[AnnouncementStatus],
    ) -> ConsoleResult<RefreshOutcome> {
        let mut filters = self.list.requested_query().filters;
        filters.set("status", statuses.iter().map(|s| s.as_str()));
        self.list
            .change_query(QueryChange::new().filters(filters))
            .await
    }

    pub fn show_create(&self) {
        self.form.open_for_create();
    }

    pub fn show_detail(&self, record: Record) {
        self.form.open_for_view(record);
    }

    pub fn set_content(&self, html: impl Into<String>) {
        self.form.set_content(html);
    }

    pub fn close(&self) {
        self.form.cancel();
    }

    /// Schedule the announcement in the edit buffer for `send_time` (`YYYY-MM-DD HH:MM:SS`).
    pub async fn create(&self, send_time: Option<&str>) -> ConsoleResult<Record> {
        let mut fields = Record::new();
        if let Some(send_time) = send_time {
            fields.insert("date", send_time);
        }
        self.form.submit(fields).await
    }

    /// Delete by task id and reload the list.
    pub async fn delete(&self, record: &Record) -> ConsoleResult<RefreshOutcome> {
        let Some(task_id) = record.id_string(TASK_ID_FIELD) else {
            let error = ConsoleError::MissingIdentifier {
                field: TASK_ID_FIELD.to_string(),
            };
            report_failure(self.notifier.as_ref(), COLLECTION, "Delete", &error);
            return Err(error);
        };
        self.list.delete_record(&task_id).await
    }
}
