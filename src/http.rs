//! HTTP client construction and redirect helpers.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::Url;

use crate::config::HandshakeConfig;

/// Build a client for one handshake.
///
/// Redirects are never followed by the client: every hop has to be seen by
/// the stage that issued it. The cookie store lives inside the returned
/// client, so each handshake gets its own jar.
pub fn build_client(config: &HandshakeConfig) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .user_agent(config.user_agent.clone())
        .default_headers(browser_headers())
        .timeout(config.request_timeout);
    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    builder.build()
}

/// Headers a browser sends on every navigation.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/json;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

/// Location header of a response, if any.
pub fn location(headers: &HeaderMap) -> Option<String> {
    headers
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Resolve a possibly relative `Location` against the URL it came from.
pub fn resolve_location(base: &Url, location: &str) -> Option<Url> {
    base.join(location).ok()
}
