//! The six handshake stages.
//!
//! Each stage borrows the [`Session`], takes the previous stage's output by
//! reference, performs its exchange(s) and returns the next value. None of
//! them keep state anywhere else, so each can be driven on its own with
//! hand-made inputs.

use chrono::{DateTime, Utc};
use reqwest::{StatusCode, Url};
use scraper::Html;
use serde_json::Value;

use super::classify::{classify, json_string, select_attr};
use super::credentials::Credentials;
use super::session::{Session, StageResponse};
use super::token::TokenBundle;
use crate::error::{HandshakeError, Result, Stage};

const PARSE_JSON_MESSAGE: &str = "Failed to parse json.";
const STATE_INPUT_SELECTOR: &str = r#"input[name="state"]"#;

/// Anti-forgery token issued at the start of the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Authorization URL derived from the CSRF token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationUrl {
    url: Url,
    status: StatusCode,
}

impl AuthorizationUrl {
    pub fn new(url: Url, status: StatusCode) -> Self {
        Self { url, status }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Status of the response that issued the URL.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Continuation token binding the verification requests to one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState(String);

impl SessionState {
    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stage 1: fetch the CSRF token.
pub async fn obtain_csrf_token(session: &Session) -> Result<CsrfToken> {
    let stage = Stage::Csrf;
    let request = session.get(session.endpoints().csrf_url.as_str());
    let response = session.exchange(stage, request).await?;
    if response.status != StatusCode::OK {
        return Err(reject(session, stage, &response));
    }

    let value = parse_json(stage, &response)?;
    json_string(&value, "csrfToken")
        .filter(|token| !token.is_empty())
        .map(CsrfToken)
        .ok_or_else(|| HandshakeError::unparseable(stage, "CSRF token missing from response."))
}

/// Stage 2: exchange the CSRF token for the authorization URL.
pub async fn derive_authorization_url(
    session: &Session,
    csrf: &CsrfToken,
) -> Result<AuthorizationUrl> {
    let stage = Stage::AuthorizationUrl;
    let form = [
        ("callbackUrl", "/"),
        ("csrfToken", csrf.as_str()),
        ("json", "true"),
    ];
    let request = session.post_form(session.endpoints().signin_url.as_str(), &form);
    let response = session.exchange(stage, request).await?;
    if response.status != StatusCode::OK {
        return Err(reject(session, stage, &response));
    }

    let value = parse_json(stage, &response)?;
    let raw = json_string(&value, "url")
        .filter(|url| !url.is_empty())
        .ok_or_else(|| HandshakeError::unparseable(stage, "Authorization url missing from response."))?;
    // The provider answers with a link to its own error page instead of a status.
    if raw.contains("error") {
        return Err(HandshakeError::stage(
            stage,
            StatusCode::FORBIDDEN.as_u16(),
            "Authorization url was rejected by the provider.",
        ));
    }
    let url = Url::parse(&raw).map_err(|e| {
        HandshakeError::unparseable(stage, format!("Invalid authorization url: {raw}")).with_source(e)
    })?;
    Ok(AuthorizationUrl::new(url, response.status))
}

/// Stage 3: follow the authorization URL and pick up the state token.
pub async fn obtain_session_state(
    session: &Session,
    authorization: &AuthorizationUrl,
) -> Result<SessionState> {
    let stage = Stage::SessionState;
    let first = session
        .exchange(stage, session.get(authorization.url().clone()))
        .await?;
    let response = session.follow_redirects(stage, first).await?;
    if !response.status.is_success() {
        return Err(reject(session, stage, &response));
    }

    if let Some(state) = query_state(&response.url) {
        return Ok(SessionState(state));
    }
    let document = Html::parse_document(&response.body);
    select_attr(&document, STATE_INPUT_SELECTOR, "value")
        .map(SessionState)
        .ok_or_else(|| {
            HandshakeError::stage(
                stage,
                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                stage.fallback_message(),
            )
        })
}

/// Stage 4: submit the username.
pub async fn verify_username(session: &Session, state: &SessionState, username: &str) -> Result<()> {
    let stage = Stage::UsernameCheck;
    let url = session.endpoints().username_check_url(state.as_str())?;
    let form = [
        ("state", state.as_str()),
        ("username", username),
        ("js-available", "true"),
        ("webauthn-available", "true"),
        ("is-brave", "false"),
        ("webauthn-platform-available", "false"),
        ("action", "default"),
    ];
    let response = session.exchange(stage, session.post_form(url, &form)).await?;
    if !accepted(response.status) {
        return Err(reject(session, stage, &response));
    }
    Ok(())
}

/// Stage 5: submit the password.
///
/// The provider answers with a redirect chain that ends by setting the
/// session cookie; it is followed here and every body is ignored.
pub async fn verify_password(
    session: &Session,
    state: &SessionState,
    credentials: &Credentials,
) -> Result<()> {
    let stage = Stage::PasswordCheck;
    let url = session.endpoints().password_check_url(state.as_str())?;
    let form = [
        ("state", state.as_str()),
        ("username", credentials.username()),
        ("password", credentials.password()),
        ("action", "default"),
    ];
    let response = session.exchange(stage, session.post_form(url, &form)).await?;
    if !accepted(response.status) {
        return Err(reject(session, stage, &response));
    }

    let last = session.follow_redirects(stage, response).await?;
    if !accepted(last.status) {
        return Err(reject(session, stage, &last));
    }
    Ok(())
}

/// Stage 6: read the token payload.
///
/// `continuation` is an optional URL visited first (redirects followed);
/// the normal flow passes `None`.
pub async fn exchange_for_token(session: &Session, continuation: Option<&str>) -> Result<TokenBundle> {
    let stage = Stage::TokenExchange;
    let session_url = session.endpoints().session_url.as_str();

    if let Some(hint) = continuation.filter(|hint| !hint.trim().is_empty()) {
        let url = Url::parse(session_url)
            .and_then(|base| base.join(hint))
            .map_err(|e| {
                HandshakeError::unparseable(stage, format!("Invalid continuation url: {hint}"))
                    .with_source(e)
            })?;
        let first = session.exchange(stage, session.get(url)).await?;
        let visited = session.follow_redirects(stage, first).await?;
        if !visited.status.is_success() {
            return Err(reject(session, stage, &visited));
        }
    }

    let response = session.exchange(stage, session.get(session_url)).await?;
    if response.status != StatusCode::OK {
        return Err(reject(session, stage, &response));
    }

    let value = parse_json(stage, &response)?;
    let access_token = json_string(&value, "accessToken")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            HandshakeError::stage(
                stage,
                StatusCode::UNAUTHORIZED.as_u16(),
                "Session did not carry an access token.",
            )
        })?;
    let expires_at = json_string(&value, "expires")
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|at| at.with_timezone(&Utc));

    Ok(TokenBundle {
        access_token,
        refresh_token: json_string(&value, "refresh_token").unwrap_or_default(),
        account_id: json_string(&value, "user.id").unwrap_or_default(),
        expires_at,
    })
}

fn accepted(status: StatusCode) -> bool {
    status.is_success() || status.is_redirection()
}

fn reject(session: &Session, stage: Stage, response: &StageResponse) -> HandshakeError {
    classify(stage, response, &session.endpoints().alert_selector)
}

fn parse_json(stage: Stage, response: &StageResponse) -> Result<Value> {
    serde_json::from_str(&response.body)
        .map_err(|e| HandshakeError::unparseable(stage, PARSE_JSON_MESSAGE).with_source(e))
}

fn query_state(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_is_read_from_query() {
        let url = Url::parse("https://id.test/u/login/identifier?state=abc%20def&x=1").unwrap();
        assert_eq!(query_state(&url).as_deref(), Some("abc def"));
        let url = Url::parse("https://id.test/u/login/identifier?state=").unwrap();
        assert_eq!(query_state(&url), None);
    }

    #[test]
    fn redirects_and_successes_are_accepted() {
        assert!(accepted(StatusCode::FOUND));
        assert!(accepted(StatusCode::OK));
        assert!(!accepted(StatusCode::BAD_REQUEST));
        assert!(!accepted(StatusCode::UNAUTHORIZED));
    }
}
