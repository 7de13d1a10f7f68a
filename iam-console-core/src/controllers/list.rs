//! List-view controller: paging, sort, filters and loading state of one collection

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use iam_console_gateway::{Page, Record, RecordGateway, Sort};
use serde::Serialize;
use tokio::sync::watch;

use crate::error::{ConsoleError, ConsoleResult};
use crate::notify::{messages, report_failure, Notification, Notifier};
use crate::types::{QueryChange, QueryState};

/// Whether a list response was applied or discarded as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RefreshOutcome {
    Applied,
    /// A later request was issued (or the controller was torn down) before this
    /// response arrived.
    Superseded,
}

/// Immutable view of the list handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSnapshot {
    /// Query of the page currently shown.
    pub query: QueryState,
    /// Query of the latest request still in flight, if any.
    pub pending: Option<QueryState>,
    pub items: Vec<Record>,
    pub total_count: u64,
    pub loading: bool,
    /// At least one page has been applied since the last reset.
    pub loaded: bool,
}

impl ListSnapshot {
    fn reset(query: QueryState) -> Self {
        Self {
            query,
            pending: None,
            items: Vec::new(),
            total_count: 0,
            loading: false,
            loaded: false,
        }
    }

    /// 1-based page number for the pager.
    pub fn display_page(&self) -> u32 {
        self.query.display_page()
    }

    /// Query new requests build on: the latest requested one, else the shown one.
    fn base_query(&self) -> &QueryState {
        self.pending.as_ref().unwrap_or(&self.query)
    }
}

/// Owns the [`QueryState`] of one collection and the page fetched for it.
///
/// Every list request is tagged with a sequence number; a response is applied only
/// if no later request was issued in the meantime. The requested query becomes the
/// shown query only together with its page, so a failed or stale request never
/// leaves half-applied paging behind.
pub struct ListController {
    gateway: Arc<dyn RecordGateway>,
    notifier: Arc<dyn Notifier>,
    page_size: u32,
    default_sort: Option<Sort>,
    issued: AtomicU64,
    state: watch::Sender<ListSnapshot>,
}

impl ListController {
    pub fn new(
        gateway: Arc<dyn RecordGateway>,
        notifier: Arc<dyn Notifier>,
        page_size: u32,
    ) -> Self {
        let (state, _) = watch::channel(ListSnapshot::reset(QueryState::new(page_size)));
        Self {
            gateway,
            notifier,
            page_size: page_size.max(1),
            default_sort: None,
            issued: AtomicU64::new(0),
            state,
        }
    }

    /// Sort applied by [`initialize`](Self::initialize) and [`teardown`](Self::teardown).
    #[must_use]
    pub fn with_default_sort(mut self, sort: Sort) -> Self {
        self.default_sort = Some(sort);
        self.state.send_replace(ListSnapshot::reset(self.default_query()));
        self
    }

    pub fn collection(&self) -> &str {
        self.gateway.collection()
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.state.subscribe()
    }

    /// Query of the page currently shown.
    pub fn query(&self) -> QueryState {
        self.state.borrow().query.clone()
    }

    /// Query of the latest request, shown or still in flight.
    pub fn requested_query(&self) -> QueryState {
        self.state.borrow().base_query().clone()
    }

    fn default_query(&self) -> QueryState {
        QueryState::new(self.page_size).with_sort(self.default_sort.clone())
    }

    /// Reset to default paging and load the first page.
    pub async fn initialize(&self) -> ConsoleResult<RefreshOutcome> {
        let query = self.default_query();
        self.state.send_replace(ListSnapshot::reset(query.clone()));
        self.fetch(query).await
    }

    /// Apply a table change and load the resulting page.
    pub async fn change_query(&self, change: QueryChange) -> ConsoleResult<RefreshOutcome> {
        let query = self.state.borrow().base_query().apply(&change);
        log::debug!(
            "[{}] Query change: page {} size {} filters {:?}",
            self.collection(),
            query.display_page(),
            query.page_size,
            query.filters
        );
        self.fetch(query).await
    }

    /// Reload the page for the latest requested query.
    pub async fn refresh(&self) -> ConsoleResult<RefreshOutcome> {
        let query = self.requested_query();
        self.fetch(query).await
    }

    /// Delete a record, then reload so paging and totals follow the backend.
    ///
    /// On failure nothing changes locally.
    pub async fn delete_record(&self, id: &str) -> ConsoleResult<RefreshOutcome> {
        if let Err(e) = self.gateway.delete_record(id).await {
            let error = ConsoleError::from(e);
            report_failure(self.notifier.as_ref(), self.collection(), "Delete", &error);
            return Err(error);
        }
        log::info!("[{}] Deleted record {id}", self.collection());
        self.notifier
            .notify(Notification::success(messages::DELETE_SUCCESS));
        self.refresh().await
    }

    /// Invalidate in-flight requests and return to defaults (screen unmount).
    pub fn teardown(&self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
        self.state
            .send_replace(ListSnapshot::reset(self.default_query()));
    }

    async fn fetch(&self, query: QueryState) -> ConsoleResult<RefreshOutcome> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.loading = true;
            s.pending = Some(query.clone());
        });

        let result = self.gateway.list_records(&query.to_list_query()).await;

        if self.issued.load(Ordering::SeqCst) != seq {
            log::debug!(
                "[{}] Discarding stale list response #{seq} ({})",
                self.collection(),
                if result.is_ok() { "ok" } else { "failed" }
            );
            return Ok(RefreshOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                self.apply_page(query, page);
                Ok(RefreshOutcome::Applied)
            }
            Err(e) => {
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.pending = None;
                });
                let error = ConsoleError::from(e);
                report_failure(self.notifier.as_ref(), self.collection(), "List", &error);
                Err(error)
            }
        }
    }

    fn apply_page(&self, query: QueryState, page: Page) {
        if !page.is_consistent() {
            log::warn!(
                "[{}] Inconsistent page: {} items, index {}, size {}, total {}",
                self.collection(),
                page.items.len(),
                page.page_index,
                page.page_size,
                page.total_count
            );
        }
        let shown = QueryState {
            page_index: page.page_index,
            page_size: page.page_size,
            ..query
        };
        self.state.send_modify(|s| {
            s.query = shown;
            s.pending = None;
            s.items = page.items;
            s.total_count = page.total_count;
            s.loading = false;
            s.loaded = true;
        });
    }
}
