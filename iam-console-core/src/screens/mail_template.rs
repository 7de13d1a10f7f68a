//! Mail templates: typed, rich-text message templates used by the notify service

use std::collections::BTreeMap;
use std::sync::Arc;

use iam_console_gateway::{Endpoint, Record, RecordGateway, Sort};
use serde::Serialize;

use super::Scope;
use crate::controllers::{FormController, FormSchema, ListController, RefreshOutcome};
use crate::error::{ConsoleError, ConsoleResult};
use crate::notify::{report_failure, Notifier};
use crate::types::{QueryChange, SelectionMode};
use crate::validation::Validator;

pub const COLLECTION: &str = "mail-templates";

/// Option list holding the template types.
pub const TYPE_FIELD: &str = "type";

pub const TITLE_MAX_CHARS: usize = 241;

const PREDEFINED_FIELD: &str = "isPredefined";
const VERSION_FIELD: &str = "objectVersionNumber";

/// REST layout of the template collection for `scope`.
pub fn endpoint(scope: &Scope) -> Endpoint {
    let base = match scope {
        Scope::Organization { id, .. } => format!(
            "/notify/v1/notices/emails/templates/organizations/{}",
            urlencoding::encode(id)
        ),
        _ => "/notify/v1/notices/emails/templates".to_string(),
    };
    Endpoint::new(COLLECTION, base.clone()).with_option_path(TYPE_FIELD, format!("{base}/types"))
}

/// Whether a template ships with the platform or was created by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemplateSource {
    Predefined,
    Custom,
}

impl TemplateSource {
    pub fn of(record: &Record) -> Self {
        if record.get_bool(PREDEFINED_FIELD).unwrap_or(false) {
            Self::Predefined
        } else {
            Self::Custom
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Predefined => "Predefined",
            Self::Custom => "Custom",
        }
    }
}

/// Predefined templates can be edited but never deleted.
pub fn can_delete(record: &Record) -> bool {
    TemplateSource::of(record) == TemplateSource::Custom
}

fn copy_fields(source: &Record, fields: &[&str]) -> Record {
    let mut copy = Record::new();
    for field in fields {
        if let Some(value) = source.get(field) {
            copy.insert(*field, value.clone());
        }
    }
    copy
}

struct MailTemplateForm;

impl FormSchema for MailTemplateForm {
    fn validators(&self, _mode: SelectionMode) -> Vec<Validator> {
        vec![
            Validator::required_text("code", "Please enter the template code"),
            Validator::required_text("name", "Please enter the template name"),
            Validator::required(TYPE_FIELD, "Please choose the template type"),
            Validator::required_text("title", "Please enter the mail subject"),
            Validator::max_length(
                "title",
                TITLE_MAX_CHARS,
                format!("The mail subject is limited to {TITLE_MAX_CHARS} characters"),
            ),
            Validator::rich_content("content", "Please enter the mail content"),
        ]
    }

    fn content_field(&self) -> Option<&str> {
        Some("content")
    }

    fn prefetch_on_edit(&self) -> bool {
        true
    }

    fn initial_values(
        &self,
        mode: SelectionMode,
        record: Option<&Record>,
        options: &BTreeMap<String, Vec<String>>,
    ) -> Record {
        let mut initial = match (mode, record) {
            (SelectionMode::Edit, Some(detail)) => {
                copy_fields(detail, &["code", "name", TYPE_FIELD, "title"])
            }
            // "based on": type and subject carry over, code and name do not
            (SelectionMode::Create, Some(seed)) => copy_fields(seed, &[TYPE_FIELD, "title"]),
            (SelectionMode::View, Some(record)) => record.clone(),
            _ => Record::new(),
        };
        if mode == SelectionMode::Create && initial.get(TYPE_FIELD).is_none() {
            if let Some(first) = options.get(TYPE_FIELD).and_then(|types| types.first()) {
                initial.insert(TYPE_FIELD, first.clone());
            }
        }
        initial
    }

    fn build_body(&self, mode: SelectionMode, fields: Record, current: Option<&Record>) -> Record {
        let mut body = fields;
        match (mode, current) {
            (SelectionMode::Edit, Some(detail)) => {
                for field in ["id", PREDEFINED_FIELD, VERSION_FIELD] {
                    if let Some(value) = detail.get(field) {
                        body.insert(field, value.clone());
                    }
                }
            }
            _ => {
                body.insert(PREDEFINED_FIELD, false);
            }
        }
        body
    }
}

/// Template list (newest first) with create, "based on", modify and delete.
pub struct MailTemplateScreen {
    list: Arc<ListController>,
    form: FormController,
    notifier: Arc<dyn Notifier>,
}

impl MailTemplateScreen {
    pub fn new(
        gateway: Arc<dyn RecordGateway>,
        notifier: Arc<dyn Notifier>,
        page_size: u32,
    ) -> Self {
        let list = Arc::new(
            ListController::new(gateway.clone(), notifier.clone(), page_size)
                .with_default_sort(Sort::descending("id")),
        );
        let form = FormController::new(
            gateway,
            list.clone(),
            notifier.clone(),
            Arc::new(MailTemplateForm),
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

    /// Template types, loaded on first use.
    pub async fn template_types(&self) -> ConsoleResult<Vec<String>> {
        self.form.load_options(TYPE_FIELD).await
    }

    /// Opening a panel still works without the type list; the failure is already reported.
    async fn ensure_types(&self) {
        if let Err(e) = self.template_types().await {
            log::debug!("[{COLLECTION}] Opening without template types: {e}");
        }
    }

    pub async fn open_create(&self) {
        self.ensure_types().await;
        self.form.open_for_create();
    }

    /// Create a new template starting from an existing one.
    pub async fn open_based_on(&self, record: &Record) -> ConsoleResult<()> {
        self.ensure_types().await;
        self.form.open_based_on(record).await
    }

    pub async fn open_modify(&self, record: &Record) -> ConsoleResult<()> {
        self.ensure_types().await;
        self.form.open_for_edit(record).await
    }

    /// Full template behind a list row, e.g. to check `isPredefined` before a delete.
    pub async fn detail(&self, record: &Record) -> ConsoleResult<Record> {
        self.form.load_detail(record).await
    }

    pub fn set_content(&self, html: impl Into<String>) {
        self.form.set_content(html);
    }

    pub fn cancel(&self) {
        self.form.cancel();
    }

    /// Submit `code`, `name`, `type` and `title` together with the edited content.
    pub async fn submit(&self, fields: Record) -> ConsoleResult<Record> {
        self.form.submit(fields).await
    }

    pub async fn delete(&self, record: &Record) -> ConsoleResult<RefreshOutcome> {
        if !can_delete(record) {
            let error = ConsoleError::ReadOnly("predefined templates cannot be deleted".to_string());
            report_failure(self.notifier.as_ref(), COLLECTION, "Delete", &error);
            return Err(error);
        }
        let Some(id) = record.id_string("id") else {
            let error = ConsoleError::MissingIdentifier {
                field: "id".to_string(),
            };
            report_failure(self.notifier.as_ref(), COLLECTION, "Delete", &error);
            return Err(error);
        };
        self.list.delete_record(&id).await
    }
}
