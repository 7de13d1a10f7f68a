//! In-process record gateway

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{GatewayError, Result};
use crate::traits::RecordGateway;
use crate::types::{ListQuery, Page, Record, SortDirection, compare_values, literal};

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<Record>,
    next_id: u64,
    options: BTreeMap<String, Vec<String>>,
    fail_next: Option<String>,
}

/// A complete in-memory collection.
///
/// Filters, free-text params, sorting and 1-based paging behave like the console
/// backends. New records receive sequential integer ids in `id_field`.
pub struct InMemoryGateway {
    collection: String,
    id_field: String,
    state: RwLock<MemoryState>,
}

impl InMemoryGateway {
    pub fn new(collection: impl Into<String>, id_field: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id_field: id_field.into(),
            state: RwLock::new(MemoryState {
                next_id: 1,
                ..MemoryState::default()
            }),
        }
    }

    /// Create a gateway holding `records`. Numeric ids continue after the largest seeded one.
    pub fn with_records(
        collection: impl Into<String>,
        id_field: impl Into<String>,
        records: Vec<Record>,
    ) -> Self {
        let gateway = Self::new(collection, id_field);
        let max_id = records
            .iter()
            .filter_map(|r| r.get(&gateway.id_field).and_then(Value::as_u64))
            .max()
            .unwrap_or(0);
        let state = MemoryState {
            records,
            next_id: max_id + 1,
            ..MemoryState::default()
        };
        Self {
            state: RwLock::new(state),
            ..gateway
        }
    }

    /// Option values returned by [`RecordGateway::list_options`] for `field`.
    pub async fn set_options(&self, field: impl Into<String>, values: Vec<String>) {
        self.state.write().await.options.insert(field.into(), values);
    }

    /// Make the next call fail with a failure envelope carrying `message`.
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.state.write().await.fail_next = Some(message.into());
    }

    /// Snapshot of every stored record.
    pub async fn records(&self) -> Vec<Record> {
        self.state.read().await.records.clone()
    }

    fn injected_failure(&self, state: &mut MemoryState) -> Result<()> {
        match state.fail_next.take() {
            Some(message) => Err(GatewayError::Rejected {
                collection: self.collection.clone(),
                code: None,
                message,
            }),
            None => Ok(()),
        }
    }

    fn not_found(&self, id: &str) -> GatewayError {
        GatewayError::NotFound {
            collection: self.collection.clone(),
            id: id.to_string(),
            raw_message: None,
        }
    }

    fn position(&self, state: &MemoryState, id: &str) -> Option<usize> {
        state
            .records
            .iter()
            .position(|r| r.id_string(&self.id_field).as_deref() == Some(id))
    }
}

/// Case-insensitive match of every term against any string field.
fn matches_params(record: &Record, params: &[String]) -> bool {
    params.iter().all(|term| {
        let term = term.to_lowercase();
        record.fields().any(|(_, value)| {
            literal(value).is_some_and(|text| text.to_lowercase().contains(&term))
        })
    })
}

#[async_trait]
impl RecordGateway for InMemoryGateway {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn list_records(&self, query: &ListQuery) -> Result<Page> {
        let mut state = self.state.write().await;
        self.injected_failure(&mut state)?;

        let query = query.validated(u32::MAX);
        let mut matched: Vec<Record> = state
            .records
            .iter()
            .filter(|r| r.matches(&query.filters) && matches_params(r, &query.params))
            .cloned()
            .collect();

        if let Some(sort) = &query.sort {
            matched.sort_by(|a, b| {
                let ordering = compare_values(a.get(&sort.key), b.get(&sort.key));
                match sort.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        let total = matched.len() as u64;
        let page_index = query.page - 1;
        let start = (page_index as usize).saturating_mul(query.page_size as usize);
        let items: Vec<Record> = matched
            .into_iter()
            .skip(start)
            .take(query.page_size as usize)
            .collect();

        Ok(Page::new(items, page_index, query.page_size, total))
    }

    async fn get_record(&self, id: &str) -> Result<Record> {
        let mut state = self.state.write().await;
        self.injected_failure(&mut state)?;
        let index = self.position(&state, id).ok_or_else(|| self.not_found(id))?;
        Ok(state.records[index].clone())
    }

    async fn create_record(&self, fields: &Record) -> Result<Record> {
        let mut state = self.state.write().await;
        self.injected_failure(&mut state)?;

        let mut record = fields.clone();
        if record.id_string(&self.id_field).is_none() {
            record.insert(self.id_field.clone(), state.next_id);
            state.next_id += 1;
        }
        state.records.push(record.clone());
        Ok(record)
    }

    async fn update_record(&self, id: &str, fields: &Record) -> Result<Record> {
        let mut state = self.state.write().await;
        self.injected_failure(&mut state)?;

        let index = self.position(&state, id).ok_or_else(|| self.not_found(id))?;
        let stored = &mut state.records[index];
        let original_id = stored.get(&self.id_field).cloned();
        stored.merge(fields);
        if let Some(original_id) = original_id {
            stored.insert(self.id_field.clone(), original_id);
        }
        Ok(stored.clone())
    }

    async fn delete_record(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        self.injected_failure(&mut state)?;

        let index = self.position(&state, id).ok_or_else(|| self.not_found(id))?;
        state.records.remove(index);
        Ok(())
    }

    async fn list_options(&self, field: &str) -> Result<Vec<String>> {
        let mut state = self.state.write().await;
        self.injected_failure(&mut state)?;
        Ok(state.options.get(field).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Filters, Sort};

    fn announcements() -> InMemoryGateway {
        let records = (1..=12)
            .map(|i| {
                Record::new()
                    .with("id", i)
                    .with("content", format!("<p>notice {i}</p>"))
                    .with("status", if i % 2 == 0 { "COMPLETED" } else { "WAITING" })
            })
            .collect();
        InMemoryGateway::with_records("announcements", "id", records)
    }

    #[tokio::test]
    async fn pages_are_one_based_at_the_boundary() {
        let gateway = announcements();
        let query = ListQuery {
            page: 2,
            page_size: 5,
            ..ListQuery::default()
        };
        let page = gateway.list_records(&query).await.unwrap();
        assert_eq!(page.page_index, 1);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_count, 12);
        assert_eq!(page.items[0].id_string("id").as_deref(), Some("6"));
        assert!(page.is_consistent());
    }

    #[tokio::test]
    async fn filters_and_sort_apply_before_paging() {
        let gateway = announcements();
        let query = ListQuery {
            page: 1,
            page_size: 3,
            sort: Some(Sort::descending("id")),
            filters: Filters::new().with("status", ["WAITING"]),
            params: Vec::new(),
        };
        let page = gateway.list_records(&query).await.unwrap();
        assert_eq!(page.total_count, 6);
        let ids: Vec<String> = page
            .items
            .iter()
            .filter_map(|r| r.id_string("id"))
            .collect();
        assert_eq!(ids, ["11", "9", "7"]);
    }

    #[tokio::test]
    async fn params_search_string_fields() {
        let gateway = announcements();
        let query = ListQuery {
            params: vec!["NOTICE 1".to_string()],
            page_size: 20,
            ..ListQuery::default()
        };
        let page = gateway.list_records(&query).await.unwrap();
        // notice 1, 10, 11, 12
        assert_eq!(page.total_count, 4);
    }

    #[tokio::test]
    async fn create_assigns_next_id() {
        let gateway = announcements();
        let created = gateway
            .create_record(&Record::new().with("content", "<p>new</p>"))
            .await
            .unwrap();
        assert_eq!(created.id_string("id").as_deref(), Some("13"));
        assert_eq!(gateway.records().await.len(), 13);
    }

    #[tokio::test]
    async fn update_merges_and_keeps_id() {
        let gateway = announcements();
        let updated = gateway
            .update_record("3", &Record::new().with("status", "FAILED").with("id", 99))
            .await
            .unwrap();
        assert_eq!(updated.get_str("status"), Some("FAILED"));
        assert_eq!(updated.id_string("id").as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let gateway = announcements();
        let result = gateway.delete_record("404").await;
        assert!(matches!(result, Err(GatewayError::NotFound { id, .. }) if id == "404"));
        assert!(gateway.get_record("404").await.is_err());
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let gateway = announcements();
        gateway.fail_next("backend says no").await;
        let first = gateway.delete_record("1").await;
        assert!(
            matches!(&first, Err(GatewayError::Rejected { message, .. }) if message == "backend says no")
        );
        assert_eq!(gateway.records().await.len(), 12);
        assert!(gateway.delete_record("1").await.is_ok());
        assert_eq!(gateway.records().await.len(), 11);
    }

    #[tokio::test]
    async fn options_per_field() {
        let gateway = InMemoryGateway::new("mail-templates", "id");
        gateway
            .set_options("type", vec!["register".to_string(), "reset".to_string()])
            .await;
        assert_eq!(gateway.list_options("type").await.unwrap(), ["register", "reset"]);
        assert!(gateway.list_options("other").await.unwrap().is_empty());
    }
}
