//! # iam-console-gateway
//!
//! The remote data boundary of the IAM console screens: one [`RecordGateway`] per
//! record collection, with list, detail, create, update, delete and option-list
//! operations.
//!
//! ## Backends
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`RestGateway`] | Console REST API (paged Spring-style bodies, `{failed, message}` envelopes) |
//! | [`InMemoryGateway`] | In-process collection for tests and offline use |
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: use the platform's native TLS implementation.
//! - **`rustls`**: use rustls.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use iam_console_gateway::{
//!     create_http_client, Endpoint, Filters, ListQuery, RecordGateway, RestGateway,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = create_http_client(Duration::from_secs(10), Duration::from_secs(30))?;
//!     let gateway = RestGateway::new(
//!         client,
//!         "https://console.example.com",
//!         Endpoint::new("announcements", "/asgard/v1/system_notice"),
//!     )
//!     .with_access_token("token");
//!
//!     let query = ListQuery {
//!         filters: Filters::new().with("status", ["WAITING"]),
//!         ..ListQuery::default()
//!     };
//!     let page = gateway.list_records(&query).await?;
//!     println!("page {} of {} records", page.display_page(), page.total_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, GatewayError>`](GatewayError). Backend failure
//! envelopes become [`GatewayError::Rejected`] with the message kept verbatim for the
//! user. Nothing is retried; callers decide whether to re-trigger an action.

mod error;
mod http_client;
mod memory;
mod rest;
mod traits;
mod types;
mod utils;

pub use error::{GatewayError, Result};

pub use http_client::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, HttpUtils, create_http_client,
};

pub use memory::InMemoryGateway;

pub use rest::{Endpoint, ID_PLACEHOLDER, ListShape, RestGateway};

pub use traits::RecordGateway;

pub use types::{
    DEFAULT_PAGE_SIZE, FailureEnvelope, Filters, ListQuery, Page, Record, Sort, SortDirection,
    SpringPage,
};

pub use utils::log_sanitizer;
