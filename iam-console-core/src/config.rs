//! Console configuration: TOML file plus environment overrides

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use iam_console_gateway::{
    create_http_client, Endpoint, RestGateway, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConsoleError, ConsoleResult};
use crate::screens::Scope;

pub const ENV_BASE_URL: &str = "IAM_CONSOLE_BASE_URL";
pub const ENV_TOKEN: &str = "IAM_CONSOLE_TOKEN";
pub const ENV_PAGE_SIZE: &str = "IAM_CONSOLE_PAGE_SIZE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub default_page_size: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub scope: Scope,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            access_token: None,
            default_page_size: DEFAULT_PAGE_SIZE,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            scope: Scope::Site,
        }
    }
}

impl ConsoleConfig {
    /// `<config_dir>/iam-console/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("iam-console").join("config.toml"))
    }

    /// Read and validate a TOML file. Environment overrides are not applied.
    pub fn load(path: &Path) -> ConsoleResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ConsoleError::Config(format!("failed to read '{}': {e}", path.display()))
        })?;
        let config = Self::from_toml(&raw)?;
        log::debug!("Loaded console config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> ConsoleResult<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| ConsoleError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` (or the default file when present), then apply environment overrides.
    pub fn load_default(path: Option<&Path>) -> ConsoleResult<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path)?,
                _ => {
                    log::debug!("No console config file, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (the process environment in [`load_default`](Self::load_default)).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConsoleResult<()> {
        if let Some(v) = lookup(ENV_BASE_URL) {
            self.base_url = v;
        }
        if let Some(v) = lookup(ENV_TOKEN) {
            self.access_token = Some(v).filter(|token| !token.is_empty());
        }
        if let Some(v) = lookup(ENV_PAGE_SIZE) {
            self.default_page_size = v.trim().parse().map_err(|_| {
                ConsoleError::Config(format!("{ENV_PAGE_SIZE} must be a positive integer, got '{v}'"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ConsoleResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConsoleError::Config(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.default_page_size == 0 {
            return Err(ConsoleError::Config(
                "default_page_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Shared HTTP client with the configured timeouts.
    pub fn http_client(&self) -> ConsoleResult<reqwest::Client> {
        create_http_client(
            Duration::from_secs(self.connect_timeout_secs),
            Duration::from_secs(self.request_timeout_secs),
        )
        .map_err(|e| ConsoleError::Config(format!("failed to build HTTP client: {e}")))
    }

    /// REST gateway for `endpoint` on the configured backend.
    pub fn rest_gateway(&self, client: &reqwest::Client, endpoint: Endpoint) -> RestGateway {
        let gateway = RestGateway::new(client.clone(), &self.base_url, endpoint);
        match &self.access_token {
            Some(token) => gateway.with_access_token(token),
            None => gateway,
        }
    }
}
