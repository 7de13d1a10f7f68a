//! Generic HTTP client tools
//!
//! Shared request processing for REST-backed collections: sending, logging,
//! status classification and JSON parsing. Requests are sent exactly once.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::GatewayError;
use crate::types::FailureEnvelope;
use crate::utils::log_sanitizer::truncate_for_log;

/// Default connect timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build an HTTP client with connect and request timeouts.
pub fn create_http_client(
    connect_timeout: Duration,
    request_timeout: Duration,
) -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns status code and response text.
    ///
    /// # Arguments
    /// * `request_builder` - configured request (URL, headers, body)
    /// * `collection` - collection name (for logging and errors)
    /// * `method_name` - request method name (for logging)
    /// * `url` - request URL (for logging)
    pub async fn execute_request(
        request_builder: RequestBuilder,
        collection: &str,
        method_name: &str,
        url: &str,
    ) -> Result<(u16, String), GatewayError> {
        log::debug!("[{collection}] {method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout {
                    collection: collection.to_string(),
                    detail: e.to_string(),
                }
            } else if e.is_builder() || e.is_body() {
                GatewayError::SerializationError {
                    collection: collection.to_string(),
                    detail: e.to_string(),
                }
            } else {
                GatewayError::NetworkError {
                    collection: collection.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{collection}] Response Status: {status_code}");

        let response_text = response
            .text()
            .await
            .map_err(|e| GatewayError::NetworkError {
                collection: collection.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{collection}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Classify a response before its body is parsed.
    ///
    /// A failure envelope wins over the status code, since backends report logical
    /// failures with both 200 and 4xx statuses. `record_id` fills `NotFound` errors.
    pub fn check_status(
        status_code: u16,
        response_text: &str,
        collection: &str,
        record_id: Option<&str>,
    ) -> Result<(), GatewayError> {
        if let Some(envelope) = serde_json::from_str::<FailureEnvelope>(response_text)
            .ok()
            .filter(|envelope| envelope.failed)
        {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("Request failed (HTTP {status_code})"));
            log::warn!("[{collection}] Rejected by backend: {message}");
            return Err(GatewayError::Rejected {
                collection: collection.to_string(),
                code: envelope.code,
                message,
            });
        }

        let raw_message = || {
            if response_text.is_empty() {
                None
            } else {
                Some(truncate_for_log(response_text))
            }
        };

        match status_code {
            200..=299 => Ok(()),
            400 | 422 => Err(GatewayError::InvalidParameter {
                collection: collection.to_string(),
                param: "body".to_string(),
                detail: truncate_for_log(response_text),
            }),
            401 => Err(GatewayError::Unauthenticated {
                collection: collection.to_string(),
                raw_message: raw_message(),
            }),
            403 => Err(GatewayError::PermissionDenied {
                collection: collection.to_string(),
                raw_message: raw_message(),
            }),
            404 => Err(GatewayError::NotFound {
                collection: collection.to_string(),
                id: record_id.unwrap_or_default().to_string(),
                raw_message: raw_message(),
            }),
            409 => Err(GatewayError::Conflict {
                collection: collection.to_string(),
                raw_message: raw_message(),
            }),
            _ => Err(GatewayError::Unknown {
                collection: collection.to_string(),
                status: Some(status_code),
                raw_message: truncate_for_log(response_text),
            }),
        }
    }

    /// Parse JSON response
    ///
    /// # Returns
    /// * `Ok(T)` - successfully parsed
    /// * `Err(GatewayError::ParseError)` - parsing failed
    pub fn parse_json<T>(response_text: &str, collection: &str) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[{collection}] JSON parse failed: {e}");
            log::error!(
                "[{collection}] Raw response: {}",
                truncate_for_log(response_text)
            );
            GatewayError::ParseError {
                collection: collection.to_string(),
                detail: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses_pass() {
        assert!(HttpUtils::check_status(200, "{\"id\":1}", "c", None).is_ok());
        assert!(HttpUtils::check_status(204, "", "c", None).is_ok());
    }

    #[test]
    fn envelope_wins_over_success_status() {
        let body = r#"{"failed":true,"code":"error.exist","message":"already exists"}"#;
        let result = HttpUtils::check_status(200, body, "c", None);
        assert!(
            matches!(
                &result,
                Err(GatewayError::Rejected { message, code: Some(code), .. })
                    if message == "already exists" && code == "error.exist"
            ),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn envelope_without_message_gets_generic_text() {
        let result = HttpUtils::check_status(400, r#"{"failed":true}"#, "c", None);
        assert!(
            matches!(&result, Err(GatewayError::Rejected { message, .. }) if message.contains("HTTP 400")),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn status_classification() {
        assert!(matches!(
            HttpUtils::check_status(401, "", "c", None),
            Err(GatewayError::Unauthenticated { raw_message: None, .. })
        ));
        assert!(matches!(
            HttpUtils::check_status(403, "denied", "c", None),
            Err(GatewayError::PermissionDenied { .. })
        ));
        assert!(matches!(
            HttpUtils::check_status(404, "", "c", Some("17")),
            Err(GatewayError::NotFound { id, .. }) if id == "17"
        ));
        assert!(matches!(
            HttpUtils::check_status(409, "version mismatch", "c", None),
            Err(GatewayError::Conflict { .. })
        ));
        assert!(matches!(
            HttpUtils::check_status(422, "bad", "c", None),
            Err(GatewayError::InvalidParameter { .. })
        ));
        assert!(matches!(
            HttpUtils::check_status(500, "oops", "c", None),
            Err(GatewayError::Unknown { status: Some(500), .. })
        ));
    }

    #[test]
    fn array_bodies_are_not_envelopes() {
        assert!(HttpUtils::check_status(200, "[1,2,3]", "c", None).is_ok());
    }

    #[test]
    fn parse_json_valid() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Foo {
            x: i32,
        }
        let result: Result<Foo, GatewayError> = HttpUtils::parse_json(r#"{"x":42}"#, "test");
        assert!(
            matches!(&result, Ok(Foo { x: 42 })),
            "unexpected parse result: {result:?}"
        );
    }

    #[test]
    fn parse_json_invalid() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Foo {
            x: i32,
        }
        let result: Result<Foo, GatewayError> = HttpUtils::parse_json("not json", "test");
        assert!(
            matches!(&result, Err(GatewayError::ParseError { .. })),
            "unexpected parse result: {result:?}"
        );
    }

    #[test]
    fn client_builds_with_default_timeouts() {
        let client = create_http_client(
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        );
        assert!(client.is_ok());
    }
}
