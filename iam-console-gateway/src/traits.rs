use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ListQuery, Page, Record};

/// Remote boundary of one record collection.
///
/// One instance serves one collection (announcements of a scope, mail templates of a
/// scope, the current user's projects). Implementations must not retry failed calls.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// Collection identifier, used in logs and error values.
    fn collection(&self) -> &str;

    /// Fetch one page. `query.page` is 1-indexed; the returned page index is 0-based.
    async fn list_records(&self, query: &ListQuery) -> Result<Page>;

    /// Fetch the full record behind `id`.
    async fn get_record(&self, id: &str) -> Result<Record>;

    /// Create a record from a field map and return what the backend stored.
    async fn create_record(&self, fields: &Record) -> Result<Record>;

    /// Update the record behind `id` and return the stored result.
    async fn update_record(&self, id: &str, fields: &Record) -> Result<Record>;

    async fn delete_record(&self, id: &str) -> Result<()>;

    /// Option values for a selectable field (for example mail template types).
    ///
    /// Collections without option lists return an empty list.
    async fn list_options(&self, _field: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
