//! Shared test helpers and a mock identity provider.
#![allow(dead_code)]

use auth_handshake::auth::{Authenticator, Credentials};
use auth_handshake::config::{HandshakeConfig, ProviderEndpoints};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const CSRF_TOKEN: &str = "csrf-token-1";
pub const STATE: &str = "STATE123";
pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "hunter2";
pub const ACCESS_TOKEN: &str = "access-1";
pub const REFRESH_TOKEN: &str = "refresh-1";
pub const ACCOUNT_ID: &str = "user-1";

pub const CSRF_PATH: &str = "/api/auth/csrf";
pub const SIGNIN_PATH: &str = "/api/auth/signin/auth0";
pub const AUTHORIZE_PATH: &str = "/authorize";
pub const IDENTIFIER_PATH: &str = "/u/login/identifier";
pub const PASSWORD_PATH: &str = "/u/login/password";
pub const RESUME_PATH: &str = "/authorize/resume";
pub const CALLBACK_PATH: &str = "/api/auth/callback/auth0";
pub const SESSION_PATH: &str = "/api/auth/session";

/// A wiremock server speaking the provider's login contract.
///
/// The application and identity origins are the same server. Tests that need
/// a stage to misbehave mount an override with a higher priority.
pub struct MockIdentityProvider {
    pub server: MockServer,
}

impl MockIdentityProvider {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Start a server with every stage answering successfully.
    pub async fn happy() -> Self {
        let provider = Self::start().await;
        provider.mount_happy_path().await;
        provider
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn endpoints(&self) -> ProviderEndpoints {
        ProviderEndpoints::from_base_urls(&self.uri(), &self.uri())
    }

    pub fn config(&self) -> HandshakeConfig {
        HandshakeConfig::new().with_endpoints(self.endpoints())
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.config())
    }

    pub async fn mount_happy_path(&self) {
        let uri = self.uri();

        Mock::given(method("GET"))
            .and(path(CSRF_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "next-auth.csrf-token=csrf-cookie; Path=/")
                    .set_body_json(json!({ "csrfToken": CSRF_TOKEN })),
            )
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path(SIGNIN_PATH))
            .and(query_param("prompt", "login"))
            .and(body_string_contains(format!("csrfToken={CSRF_TOKEN}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "url": format!("{uri}{AUTHORIZE_PATH}?client_id=app&response_type=code")
            })))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(AUTHORIZE_PATH))
            .respond_with(redirect_to(&format!("{IDENTIFIER_PATH}?state={STATE}")))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(IDENTIFIER_PATH))
            .respond_with(html(200, &login_page(STATE)))
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path(IDENTIFIER_PATH))
            .and(query_param("state", STATE))
            .and(body_string_contains(format!("username={USERNAME}")))
            .respond_with(redirect_to(&format!("{PASSWORD_PATH}?state={STATE}")))
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path(PASSWORD_PATH))
            .and(query_param("state", STATE))
            .and(body_string_contains(format!("password={PASSWORD}")))
            .respond_with(redirect_to(&format!("{RESUME_PATH}?state={STATE}")))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(RESUME_PATH))
            .respond_with(redirect_to(&format!("{CALLBACK_PATH}?code=code-1")))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(CALLBACK_PATH))
            .respond_with(
                redirect_to("/").insert_header("set-cookie", "session-token=sess-1; Path=/; HttpOnly"),
            )
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(200, "<html><body>home</body></html>"))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(SESSION_PATH))
            .and(header_regex("cookie", "session-token=sess-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_payload()))
            .mount(&self.server)
            .await;
    }

    /// Mount a response that takes precedence over the happy path.
    pub async fn override_route(&self, verb: &str, route: &str, response: ResponseTemplate) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(response)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    pub async fn requests_to(&self, verb: &str, route: &str) -> Vec<Request> {
        self.requests()
            .await
            .into_iter()
            .filter(|r| r.method.as_str() == verb && r.url.path() == route)
            .collect()
    }
}

pub fn credentials() -> Credentials {
    Credentials::new(USERNAME, PASSWORD)
}

pub fn session_payload() -> serde_json::Value {
    json!({
        "user": { "id": ACCOUNT_ID, "name": "Alice" },
        "expires": "2030-01-01T00:00:00.000Z",
        "accessToken": ACCESS_TOKEN,
        "refresh_token": REFRESH_TOKEN
    })
}

pub fn redirect_to(location: &str) -> ResponseTemplate {
    ResponseTemplate::new(302).insert_header("location", location)
}

pub fn html(status: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

pub fn alert_page(message: &str) -> String {
    format!(
        r#"<html><body><section><div class="message">
            {message}
        </div></section></body></html>"#
    )
}

pub fn login_page(state: &str) -> String {
    format!(
        r#"<html><body><form method="POST">
            <input type="hidden" name="state" value="{state}">
            <input name="username" type="text">
        </form></body></html>"#
    )
}
