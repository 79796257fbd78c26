//! Session context for one handshake.

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{RequestBuilder, StatusCode, Url};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::config::{HandshakeConfig, ProviderEndpoints};
use crate::error::{HandshakeError, Result, Stage};
use crate::http;
use crate::util::timeout::guarded;

/// Everything a stage needs from one provider response.
///
/// The body is read in full and the underlying response dropped before this
/// value exists, so the connection is already released when a stage sees it.
#[derive(Debug, Clone)]
pub struct StageResponse {
    pub status: StatusCode,
    /// Final URL of the request.
    pub url: Url,
    /// Raw `Location` header, present on redirects.
    pub location: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// HTTP client handle, provider contract and cancellation scope of one
/// handshake.
///
/// A session holds no handshake state of its own; stage outputs are passed
/// between stages as values. When built from a [`HandshakeConfig`] the
/// session owns a fresh client, and with it a cookie jar nobody else sees.
pub struct Session {
    id: Uuid,
    client: reqwest::Client,
    endpoints: ProviderEndpoints,
    user_agent: String,
    max_redirects: usize,
    max_body_bytes: usize,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl Session {
    /// Start a session with a freshly built client.
    pub fn new(config: &HandshakeConfig) -> Result<Self> {
        Ok(Self::with_client(config.build_client()?, config))
    }

    /// Start a session on a caller-supplied client.
    ///
    /// The client should keep cookies and must not follow redirects itself.
    pub fn with_client(client: reqwest::Client, config: &HandshakeConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            client,
            endpoints: config.endpoints.clone(),
            user_agent: config.user_agent.clone(),
            max_redirects: config.max_redirects,
            max_body_bytes: config.max_body_bytes,
            cancel: CancellationToken::new(),
            deadline: config.timeout.map(|t| Instant::now() + t),
        }
    }

    /// Abort the handshake when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Identifier used to correlate this handshake's log events.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn get(&self, url: impl reqwest::IntoUrl) -> RequestBuilder {
        self.client.get(url).header(USER_AGENT, &self.user_agent)
    }

    pub(crate) fn post_form<T: serde::Serialize + ?Sized>(
        &self,
        url: impl reqwest::IntoUrl,
        form: &T,
    ) -> RequestBuilder {
        self.client
            .post(url)
            .header(USER_AGENT, &self.user_agent)
            .form(form)
    }

    /// Send one request on behalf of `stage` and read its response.
    pub(crate) async fn exchange(
        &self,
        stage: Stage,
        request: RequestBuilder,
    ) -> Result<StageResponse> {
        guarded(&self.cancel, self.deadline, stage, async move {
            let response = request
                .send()
                .await
                .map_err(|e| HandshakeError::transport(Some(stage), e))?;
            let status = response.status();
            let url = response.url().clone();
            let location = http::location(response.headers());
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = read_body(stage, response, self.max_body_bytes).await?;
            debug!(
                handshake_id = %self.id,
                stage = %stage,
                status = status.as_u16(),
                path = url.path(),
                "provider responded"
            );
            Ok(StageResponse {
                status,
                url,
                location,
                content_type,
                body,
            })
        })
        .await
    }

    /// Follow redirects starting at `response` until a non-redirect arrives.
    ///
    /// Bodies of intermediate hops are discarded.
    pub(crate) async fn follow_redirects(
        &self,
        stage: Stage,
        mut response: StageResponse,
    ) -> Result<StageResponse> {
        let mut hops = 0;
        while response.status.is_redirection() {
            let Some(location) = response.location.as_deref() else {
                break;
            };
            hops += 1;
            if hops > self.max_redirects {
                return Err(HandshakeError::stage(
                    stage,
                    StatusCode::LOOP_DETECTED.as_u16(),
                    "Too many redirects.",
                ));
            }
            let next = http::resolve_location(&response.url, location).ok_or_else(|| {
                HandshakeError::unparseable(stage, format!("Invalid redirect location: {location}"))
            })?;
            response = self.exchange(stage, self.get(next)).await?;
        }
        Ok(response)
    }
}

/// Read a response body, refusing anything larger than `limit` bytes.
async fn read_body(stage: Stage, mut response: reqwest::Response, limit: usize) -> Result<String> {
    if response
        .content_length()
        .is_some_and(|len| len > limit as u64)
    {
        return Err(body_too_large(stage, limit));
    }
    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| HandshakeError::transport(Some(stage), e))?
    {
        if body.len() + chunk.len() > limit {
            return Err(body_too_large(stage, limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

fn body_too_large(stage: Stage, limit: usize) -> HandshakeError {
    HandshakeError::unparseable(stage, format!("Response body exceeds {limit} bytes."))
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("endpoints", &self.endpoints)
            .field("max_redirects", &self.max_redirects)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("deadline", &self.deadline)
            .finish()
    }
}
