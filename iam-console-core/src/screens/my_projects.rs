//! Dashboard widget listing the current user's projects in one organization

use std::sync::{Arc, Mutex, PoisonError};

use iam_console_gateway::{Endpoint, Filters, Record, RecordGateway};

use super::Scope;
use crate::controllers::{ListController, ListSnapshot, RefreshOutcome};
use crate::error::ConsoleResult;
use crate::notify::Notifier;
use crate::types::QueryChange;

pub const COLLECTION: &str = "my-projects";

/// Filter field carrying the organization.
pub const ORGANIZATION_FILTER: &str = "organizationId";

/// The widget shows the whole list without a pager.
const WIDGET_PAGE_SIZE: u32 = 100;

/// REST layout: a plain JSON array of the user's projects.
pub fn endpoint() -> Endpoint {
    Endpoint::new(COLLECTION, "/iam/v1/users/self/projects").plain_list()
}

/// Console route opened when a project row is clicked.
pub fn project_link(record: &Record) -> Option<String> {
    let id = record.id_string("id")?;
    let name = record.get_str("name").unwrap_or_default();
    let organization_id = record.id_string("organizationId").unwrap_or_default();
    Some(format!(
        "/?type=project&id={id}&name={}&organizationId={organization_id}",
        urlencoding::encode(name)
    ))
}

pub struct MyProjectsWidget {
    list: ListController,
    organization_id: Mutex<Option<String>>,
}

impl MyProjectsWidget {
    pub fn new(gateway: Arc<dyn RecordGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            list: ListController::new(gateway, notifier, WIDGET_PAGE_SIZE),
            organization_id: Mutex::new(None),
        }
    }

    /// Organization of the last load.
    pub fn organization_id(&self) -> Option<String> {
        self.organization_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.list.snapshot()
    }

    pub fn projects(&self) -> Vec<Record> {
        self.list.snapshot().items
    }

    /// Load the projects of `organization_id`.
    ///
    /// The organization is remembered only once its projects are shown, so a
    /// failed load is retried on the next scope change.
    pub async fn load(&self, organization_id: &str) -> ConsoleResult<RefreshOutcome> {
        log::debug!("[{COLLECTION}] Loading projects of organization {organization_id}");
        let filters = Filters::new().with(ORGANIZATION_FILTER, [organization_id]);
        let outcome = self
            .list
            .change_query(
                QueryChange::new()
                    .page(0, WIDGET_PAGE_SIZE)
                    .filters(filters),
            )
            .await?;
        if outcome == RefreshOutcome::Applied {
            *self
                .organization_id
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(organization_id.to_string());
        }
        Ok(outcome)
    }

    /// Reload only when the scope points at another organization.
    ///
    /// Returns `None` when nothing was loaded.
    pub async fn on_scope_change(&self, scope: &Scope) -> ConsoleResult<Option<RefreshOutcome>> {
        let Some(organization_id) = scope.organization_id() else {
            return Ok(None);
        };
        if self.organization_id().as_deref() == Some(organization_id) {
            return Ok(None);
        }
        self.load(organization_id).await.map(Some)
    }

    pub fn unmount(&self) {
        *self
            .organization_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.list.teardown();
    }
}
