//! REST request helpers

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::types::Record;
use crate::utils::log_sanitizer::truncate_for_log;

use super::RestGateway;

impl RestGateway {
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and classify the response, returning the raw body.
    async fn send(
        &self,
        builder: RequestBuilder,
        method: &str,
        url: &str,
        record_id: Option<&str>,
    ) -> Result<String> {
        let collection = &self.endpoint.collection;
        let (status, body) =
            HttpUtils::execute_request(self.authorize(builder), collection, method, url).await?;
        HttpUtils::check_status(status, &body, collection, record_id)?;
        Ok(body)
    }

    /// GET with query pairs and parse the body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        record_id: Option<&str>,
    ) -> Result<T> {
        let url = self.url(path);
        let builder = self.client.get(&url).query(query);
        let body = self.send(builder, "GET", &url, record_id).await?;
        HttpUtils::parse_json(&body, &self.endpoint.collection)
    }

    /// POST a record body and parse the stored record.
    pub(crate) async fn post_record(&self, path: &str, fields: &Record) -> Result<Record> {
        let url = self.url(path);
        log::debug!(
            "[{}] Request Body: {}",
            self.endpoint.collection,
            truncate_for_log(&serde_json::to_string(fields).unwrap_or_default())
        );
        let builder = self.client.post(&url).json(fields);
        let body = self.send(builder, "POST", &url, None).await?;
        HttpUtils::parse_json(&body, &self.endpoint.collection)
    }

    /// PUT a record body and parse the stored record.
    pub(crate) async fn put_record(&self, path: &str, id: &str, fields: &Record) -> Result<Record> {
        let url = self.url(path);
        log::debug!(
            "[{}] Request Body: {}",
            self.endpoint.collection,
            truncate_for_log(&serde_json::to_string(fields).unwrap_or_default())
        );
        let builder = self.client.put(&url).json(fields);
        let body = self.send(builder, "PUT", &url, Some(id)).await?;
        HttpUtils::parse_json(&body, &self.endpoint.collection)
    }

    /// DELETE; any non-envelope 2xx body counts as acknowledgment.
    pub(crate) async fn delete(&self, path: &str, id: &str) -> Result<()> {
        let url = self.url(path);
        let builder = self.client.delete(&url);
        self.send(builder, "DELETE", &url, Some(id)).await?;
        Ok(())
    }
}
