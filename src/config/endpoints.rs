//! Provider endpoint contract.

use reqwest::Url;

use crate::error::{HandshakeError, Result, Stage};

const DEFAULT_APP_BASE_URL: &str = "https://chat.openai.com";
const DEFAULT_IDENTITY_BASE_URL: &str = "https://auth0.openai.com";
const DEFAULT_ALERT_SELECTOR: &str = ".message";

/// URLs and page selectors the handshake talks to.
///
/// These are a versioned contract with the provider, kept apart from the
/// stage logic so they can be updated without touching it.
///
/// # Example
/// ```no_run
/// use auth_handshake::config::ProviderEndpoints;
///
/// let endpoints = ProviderEndpoints::from_base_urls("http://127.0.0.1:8080", "http://127.0.0.1:8081");
/// assert_eq!(endpoints.csrf_url, "http://127.0.0.1:8080/api/auth/csrf");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    /// Issues the CSRF token (stage 1).
    pub csrf_url: String,
    /// Exchanges the CSRF token for the authorization URL (stage 2).
    pub signin_url: String,
    /// Origin of the hosted login pages (stages 4 and 5).
    pub identity_base_url: String,
    /// Returns the token payload (stage 6).
    pub session_url: String,
    /// Selector of the alert element on HTML error pages.
    pub alert_selector: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self::from_base_urls(DEFAULT_APP_BASE_URL, DEFAULT_IDENTITY_BASE_URL)
    }
}

impl ProviderEndpoints {
    /// Derive every endpoint from the application and identity origins.
    pub fn from_base_urls(app_base_url: &str, identity_base_url: &str) -> Self {
        let app = app_base_url.trim_end_matches('/');
        Self {
            csrf_url: format!("{app}/api/auth/csrf"),
            signin_url: format!("{app}/api/auth/signin/auth0?prompt=login"),
            identity_base_url: identity_base_url.trim_end_matches('/').to_string(),
            session_url: format!("{app}/api/auth/session"),
            alert_selector: DEFAULT_ALERT_SELECTOR.to_string(),
        }
    }

    pub fn with_csrf_url(mut self, url: impl Into<String>) -> Self {
        self.csrf_url = url.into();
        self
    }

    pub fn with_signin_url(mut self, url: impl Into<String>) -> Self {
        self.signin_url = url.into();
        self
    }

    pub fn with_identity_base_url(mut self, url: impl Into<String>) -> Self {
        self.identity_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_session_url(mut self, url: impl Into<String>) -> Self {
        self.session_url = url.into();
        self
    }

    pub fn with_alert_selector(mut self, selector: impl Into<String>) -> Self {
        self.alert_selector = selector.into();
        self
    }

    /// Username-check endpoint scoped by the session state.
    pub fn username_check_url(&self, state: &str) -> Result<Url> {
        self.identity_url(Stage::UsernameCheck, "/u/login/identifier", state)
    }

    /// Password-check endpoint scoped by the session state.
    pub fn password_check_url(&self, state: &str) -> Result<Url> {
        self.identity_url(Stage::PasswordCheck, "/u/login/password", state)
    }

    fn identity_url(&self, stage: Stage, path: &str, state: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{path}", self.identity_base_url)).map_err(|e| {
            HandshakeError::stage(stage, 500, format!("Invalid identity url: {e}"))
        })?;
        url.query_pairs_mut().append_pair("state", state);
        Ok(url)
    }
}
