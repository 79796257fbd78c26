//! Configuration system (layered: code > env > defaults).

pub mod endpoints;

pub use endpoints::ProviderEndpoints;

use std::time::Duration;

use crate::error::{HandshakeError, Result};

/// Browser user agent presented to the provider.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_REDIRECTS: usize = 10;
const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Settings for building handshake sessions.
///
/// Resolution order:
/// 1. Values set in code through the `with_*` methods
/// 2. `AUTH_HANDSHAKE_*` environment variables (and `.env`)
/// 3. Built-in defaults
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    pub endpoints: ProviderEndpoints,
    pub user_agent: String,
    /// Optional proxy URL applied to every request.
    pub proxy: Option<String>,
    /// Deadline for a whole handshake.
    pub timeout: Option<Duration>,
    /// Timeout for a single request.
    pub request_timeout: Duration,
    /// Redirect hops followed within one stage.
    pub max_redirects: usize,
    /// Largest response body read from the provider.
    pub max_body_bytes: usize,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HandshakeConfig {
    pub fn new() -> Self {
        Self {
            endpoints: ProviderEndpoints::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            timeout: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Load from environment variables (AUTH_HANDSHAKE_CSRF_URL, ...).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::new();

        if let Ok(url) = std::env::var("AUTH_HANDSHAKE_CSRF_URL") {
            config.endpoints.csrf_url = url;
        }
        if let Ok(url) = std::env::var("AUTH_HANDSHAKE_SIGNIN_URL") {
            config.endpoints.signin_url = url;
        }
        if let Ok(url) = std::env::var("AUTH_HANDSHAKE_IDENTITY_URL") {
            config.endpoints = config.endpoints.with_identity_base_url(url);
        }
        if let Ok(url) = std::env::var("AUTH_HANDSHAKE_SESSION_URL") {
            config.endpoints.session_url = url;
        }
        if let Ok(agent) = std::env::var("AUTH_HANDSHAKE_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Ok(proxy) = std::env::var("AUTH_HANDSHAKE_PROXY") {
            if !proxy.trim().is_empty() {
                config.proxy = Some(proxy);
            }
        }
        if let Some(secs) = env_number("AUTH_HANDSHAKE_TIMEOUT_SECS") {
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = env_number("AUTH_HANDSHAKE_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(bytes) = env_number("AUTH_HANDSHAKE_MAX_BODY_BYTES") {
            config.max_body_bytes = bytes;
        }

        config
    }

    pub fn with_endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_redirects(mut self, hops: usize) -> Self {
        self.max_redirects = hops;
        self
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Build a fresh HTTP client for one handshake.
    ///
    /// Every call returns a client with its own empty cookie jar.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        crate::http::build_client(self).map_err(|e| HandshakeError::transport(None, e))
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring non-numeric setting");
            None
        }
    }
}
