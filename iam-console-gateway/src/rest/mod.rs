//! REST-backed record gateway

mod endpoint;
mod gateway;
mod http;

use reqwest::Client;

use crate::utils::log_sanitizer::mask_token;

pub use endpoint::{Endpoint, ID_PLACEHOLDER, ListShape};

/// Gateway talking to a console backend over HTTP.
///
/// The client is shared; clone it across gateways so connections are pooled.
pub struct RestGateway {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) endpoint: Endpoint,
    pub(crate) access_token: Option<String>,
}

impl RestGateway {
    pub fn new(client: Client, base_url: impl Into<String>, endpoint: Endpoint) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoint,
            access_token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        log::debug!(
            "[{}] Using bearer token {}",
            self.endpoint.collection,
            mask_token(&token)
        );
        self.access_token = Some(token);
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}
