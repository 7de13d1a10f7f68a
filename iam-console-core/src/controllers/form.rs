//! Form/detail controller: the side panel of a screen

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use iam_console_gateway::{Record, RecordGateway};
use serde::Serialize;
use tokio::sync::watch;

use crate::controllers::ListController;
use crate::error::{ConsoleError, ConsoleResult};
use crate::notify::{messages, report_failure, Notification, Notifier};
use crate::types::{SelectionMode, SelectionState};
use crate::validation::{validate_all, FieldError, Validator};

/// Per-screen form behavior.
pub trait FormSchema: Send + Sync {
    /// Field holding the record identifier.
    fn id_field(&self) -> &str {
        "id"
    }

    /// Validators run before a submit in `mode`.
    fn validators(&self, mode: SelectionMode) -> Vec<Validator>;

    /// Field filled from the rich-text edit buffer on submit.
    fn content_field(&self) -> Option<&str> {
        None
    }

    /// Load the full record before opening it for edit.
    fn prefetch_on_edit(&self) -> bool {
        false
    }

    /// Close the panel after a successful update instead of staying in edit mode.
    fn close_after_update(&self) -> bool {
        true
    }

    /// Initial field values shown when the panel opens.
    fn initial_values(
        &self,
        mode: SelectionMode,
        record: Option<&Record>,
        _options: &BTreeMap<String, Vec<String>>,
    ) -> Record {
        match (mode, record) {
            (SelectionMode::None, _) | (_, None) => Record::new(),
            (_, Some(record)) => record.clone(),
        }
    }

    /// Request body for the gateway. `current` is the open record, if any.
    fn build_body(&self, _mode: SelectionMode, fields: Record, _current: Option<&Record>) -> Record {
        fields
    }
}

/// Immutable view of the form handed to renderers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub selection: SelectionState,
    /// Field values the panel opens with.
    pub initial: Record,
    /// Rich-text edit buffer.
    pub content: String,
    pub submitting: bool,
    pub field_errors: Vec<FieldError>,
    /// Loaded option lists by field.
    pub options: BTreeMap<String, Vec<String>>,
}

impl FormSnapshot {
    pub fn panel_open(&self) -> bool {
        self.selection.is_open()
    }

    pub fn mode(&self) -> SelectionMode {
        self.selection.mode
    }
}

/// Owns the [`SelectionState`] of one screen.
///
/// At most one submission runs at a time; a second submit while one is in flight
/// is refused with [`ConsoleError::Busy`], even after the panel was closed or
/// reopened. Only the submit itself releases the busy flag.
pub struct FormController {
    gateway: Arc<dyn RecordGateway>,
    list: Arc<ListController>,
    notifier: Arc<dyn Notifier>,
    schema: Arc<dyn FormSchema>,
    /// Detail fetched for the record currently open, keyed by id.
    prefetched: Mutex<Option<(String, Record)>>,
    /// Bumped whenever the selection is replaced; a submit only touches the
    /// panel it was started from.
    generation: AtomicU64,
    state: watch::Sender<FormSnapshot>,
}

impl FormController {
    pub fn new(
        gateway: Arc<dyn RecordGateway>,
        list: Arc<ListController>,
        notifier: Arc<dyn Notifier>,
        schema: Arc<dyn FormSchema>,
    ) -> Self {
        let (state, _) = watch::channel(FormSnapshot::default());
        Self {
            gateway,
            list,
            notifier,
            schema,
            prefetched: Mutex::new(None),
            generation: AtomicU64::new(0),
            state,
        }
    }

    pub fn snapshot(&self) -> FormSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormSnapshot> {
        self.state.subscribe()
    }

    pub fn list(&self) -> &Arc<ListController> {
        &self.list
    }

    fn collection(&self) -> &str {
        self.gateway.collection()
    }

    fn record_id(&self, record: &Record) -> ConsoleResult<String> {
        record
            .id_string(self.schema.id_field())
            .ok_or_else(|| ConsoleError::MissingIdentifier {
                field: self.schema.id_field().to_string(),
            })
    }

    fn content_of(&self, record: Option<&Record>) -> String {
        self.schema
            .content_field()
            .and_then(|field| record.and_then(|r| r.get_str(field)))
            .unwrap_or_default()
            .to_string()
    }

    fn open(&self, selection: SelectionState) {
        let content = self.content_of(selection.record.as_ref());
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.initial =
                self.schema
                    .initial_values(selection.mode, selection.record.as_ref(), &s.options);
            s.content = content;
            s.field_errors.clear();
            s.selection = selection;
        });
    }

    /// Open an empty create form.
    pub fn open_for_create(&self) {
        self.clear_prefetched();
        self.open(SelectionState::create(None));
    }

    /// Open a create form seeded from the full detail of `record`.
    pub async fn open_based_on(&self, record: &Record) -> ConsoleResult<()> {
        let detail = self.fetch_detail(record).await?;
        self.open(SelectionState::create(Some(detail)));
        Ok(())
    }

    /// Open `record` for edit, loading its detail first when the schema asks for it.
    ///
    /// If the detail cannot be loaded the panel stays as it was.
    pub async fn open_for_edit(&self, record: &Record) -> ConsoleResult<()> {
        let detail = if self.schema.prefetch_on_edit() {
            self.fetch_detail(record).await?
        } else {
            record.clone()
        };
        self.open(SelectionState::edit(detail));
        Ok(())
    }

    pub fn open_for_view(&self, record: Record) {
        self.open(SelectionState::view(record));
    }

    /// Full detail of `record` without opening it. Failures are reported once.
    pub async fn load_detail(&self, record: &Record) -> ConsoleResult<Record> {
        self.fetch_detail(record).await
    }

    /// Close the panel and discard unsaved edits.
    pub fn cancel(&self) {
        self.reset();
    }

    /// Replace the rich-text edit buffer.
    pub fn set_content(&self, html: impl Into<String>) {
        let html = html.into();
        self.state.send_modify(|s| s.content = html);
    }

    /// Option values for `field`, loaded from the gateway once and then cached.
    pub async fn load_options(&self, field: &str) -> ConsoleResult<Vec<String>> {
        let cached = self.state.borrow().options.get(field).cloned();
        if let Some(values) = cached.filter(|values| !values.is_empty()) {
            return Ok(values);
        }
        match self.gateway.list_options(field).await {
            Ok(values) => {
                let stored = values.clone();
                self.state.send_modify(|s| {
                    s.options.insert(field.to_string(), stored);
                });
                Ok(values)
            }
            Err(e) => {
                let error = ConsoleError::from(e);
                report_failure(self.notifier.as_ref(), self.collection(), "Load options", &error);
                Err(error)
            }
        }
    }

    /// Validate and send the form.
    ///
    /// Validation failures are attached to the form and nothing is sent. Gateway
    /// failures keep the panel open. After a create the panel closes and the list
    /// reloads; after an update the list reloads and the panel closes or shows the
    /// stored record, depending on the schema.
    pub async fn submit(&self, fields: Record) -> ConsoleResult<Record> {
        let snapshot = self.snapshot();
        let mode = snapshot.selection.mode;
        match mode {
            SelectionMode::None => return Err(ConsoleError::NoSelection),
            SelectionMode::View => {
                return Err(ConsoleError::ReadOnly("record is open for viewing".to_string()))
            }
            SelectionMode::Create | SelectionMode::Edit => {}
        }
        if snapshot.submitting {
            return Err(ConsoleError::Busy);
        }

        let mut fields = fields;
        if let Some(field) = self.schema.content_field() {
            fields.insert(field, snapshot.content.clone());
        }

        if let Err(errors) = validate_all(&self.schema.validators(mode), &fields) {
            log::debug!(
                "[{}] Submit refused, invalid fields: {:?}",
                self.collection(),
                errors.iter().map(|e| e.field.as_str()).collect::<Vec<_>>()
            );
            let attached = errors.clone();
            self.state.send_modify(|s| s.field_errors = attached);
            return Err(ConsoleError::Validation(errors));
        }

        let current = snapshot.selection.record;
        let target_id = match (mode, &current) {
            (SelectionMode::Edit, Some(record)) => Some(self.record_id(record)?),
            (SelectionMode::Edit, None) => return Err(ConsoleError::NoSelection),
            _ => None,
        };

        let acquired = self.state.send_if_modified(|s| {
            if s.submitting {
                false
            } else {
                s.submitting = true;
                s.field_errors.clear();
                true
            }
        });
        if !acquired {
            return Err(ConsoleError::Busy);
        }
        let generation = self.generation.load(Ordering::SeqCst);

        let body = self.schema.build_body(mode, fields, current.as_ref());
        let result = match &target_id {
            Some(id) => self.gateway.update_record(id, &body).await,
            None => self.gateway.create_record(&body).await,
        };

        let stored = match result {
            Ok(stored) => stored,
            Err(e) => {
                self.state.send_modify(|s| s.submitting = false);
                let error = ConsoleError::from(e);
                let action = if target_id.is_some() { "Update" } else { "Create" };
                report_failure(self.notifier.as_ref(), self.collection(), action, &error);
                return Err(error);
            }
        };

        self.state.send_modify(|s| s.submitting = false);
        // 提交期间面板被关闭或重新打开时不再改动面板
        let same_panel = self.generation.load(Ordering::SeqCst) == generation;
        if !same_panel {
            log::debug!(
                "[{}] Selection changed while submitting, leaving the panel as is",
                self.collection()
            );
        }

        match target_id {
            None => {
                log::info!("[{}] Record created", self.collection());
                self.notifier
                    .notify(Notification::success(messages::CREATE_SUCCESS));
                if same_panel {
                    self.reset();
                }
            }
            Some(id) => {
                log::info!("[{}] Record {id} updated", self.collection());
                self.notifier
                    .notify(Notification::success(messages::SAVE_SUCCESS));
                if same_panel {
                    if self.schema.close_after_update() {
                        self.reset();
                    } else {
                        self.show_updated(&id, &stored);
                    }
                }
            }
        }

        if let Err(e) = self.list.refresh().await {
            log::debug!("[{}] Refresh after submit failed: {e}", self.collection());
        }
        Ok(stored)
    }

    /// Close the panel and forget any cached option lists (screen unmount).
    ///
    /// A submit still in flight keeps the form busy until it resolves.
    pub fn teardown(&self) {
        self.clear_prefetched();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| {
            *s = FormSnapshot {
                submitting: s.submitting,
                ..FormSnapshot::default()
            };
        });
    }

    fn reset(&self) {
        self.clear_prefetched();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.selection = SelectionState::none();
            s.initial = Record::new();
            s.content.clear();
            s.field_errors.clear();
        });
    }

    /// Keep editing the stored record, if the panel still shows the same one.
    fn show_updated(&self, id: &str, stored: &Record) {
        let id_field = self.schema.id_field();
        let mut record = self
            .state
            .borrow()
            .selection
            .record
            .clone()
            .unwrap_or_default();
        record.merge(stored);

        let content = self.content_of(Some(&record));
        self.store_prefetched(id, &record);
        self.state.send_modify(|s| {
            let same = s.selection.mode == SelectionMode::Edit
                && s.selection
                    .record
                    .as_ref()
                    .and_then(|r| r.id_string(id_field))
                    .as_deref()
                    == Some(id);
            if same {
                s.initial = self
                    .schema
                    .initial_values(SelectionMode::Edit, Some(&record), &s.options);
                s.content = content;
                s.selection.record = Some(record);
            }
        });
    }

    /// Detail of `record`, fetched at most once per opened record.
    async fn fetch_detail(&self, record: &Record) -> ConsoleResult<Record> {
        let id = self.record_id(record)?;
        if let Some(detail) = self.cached_detail(&id) {
            return Ok(detail);
        }
        match self.gateway.get_record(&id).await {
            Ok(detail) => {
                self.store_prefetched(&id, &detail);
                Ok(detail)
            }
            Err(e) => {
                let error = ConsoleError::from(e);
                report_failure(self.notifier.as_ref(), self.collection(), "Load detail", &error);
                Err(error)
            }
        }
    }

    fn cached_detail(&self, id: &str) -> Option<Record> {
        let guard = self.prefetched.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|(cached_id, _)| cached_id == id)
            .map(|(_, detail)| detail.clone())
    }

    fn store_prefetched(&self, id: &str, detail: &Record) {
        *self.prefetched.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((id.to_string(), detail.clone()));
    }

    fn clear_prefetched(&self) {
        *self.prefetched.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
