//! `RecordGateway` implementation over REST

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::RecordGateway;
use crate::types::{ListQuery, Page, Record, SpringPage};

use super::{ListShape, RestGateway};

/// Wrap a bare array response into a single page.
pub(crate) fn plain_page(items: Vec<Record>, requested_size: u32) -> Page {
    let len = u32::try_from(items.len()).unwrap_or(u32::MAX);
    let total = items.len() as u64;
    Page::new(items, 0, len.max(requested_size).max(1), total)
}

#[async_trait]
impl RecordGateway for RestGateway {
    fn collection(&self) -> &str {
        &self.endpoint.collection
    }

    async fn list_records(&self, query: &ListQuery) -> Result<Page> {
        let pairs = query.to_query_pairs();
        match self.endpoint.list_shape {
            ListShape::Paged => {
                let page: SpringPage<Record> =
                    self.get_json(&self.endpoint.list_path, &pairs, None).await?;
                Ok(page.into_page(query.page_size))
            }
            ListShape::Plain => {
                let items: Vec<Record> =
                    self.get_json(&self.endpoint.list_path, &pairs, None).await?;
                Ok(plain_page(items, query.page_size))
            }
        }
    }

    async fn get_record(&self, id: &str) -> Result<Record> {
        self.get_json(&self.endpoint.item(id), &[], Some(id)).await
    }

    async fn create_record(&self, fields: &Record) -> Result<Record> {
        self.post_record(&self.endpoint.create_path, fields).await
    }

    async fn update_record(&self, id: &str, fields: &Record) -> Result<Record> {
        self.put_record(&self.endpoint.item(id), id, fields).await
    }

    async fn delete_record(&self, id: &str) -> Result<()> {
        self.delete(&self.endpoint.item(id), id).await
    }

    async fn list_options(&self, field: &str) -> Result<Vec<String>> {
        let Some(path) = self.endpoint.option_path(field) else {
            return Ok(Vec::new());
        };
        self.get_json(path, &[], None).await
    }
}
