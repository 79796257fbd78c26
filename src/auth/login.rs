//! The login operation: the six stages run in order on one session.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::credentials::Credentials;
use super::session::Session;
use super::stages;
use super::token::TokenBundle;
use crate::config::HandshakeConfig;
use crate::error::{HandshakeError, Result};

/// Run the whole handshake on `session`.
///
/// The first failing stage ends the chain; its error is returned as is.
/// A session whose token is already cancelled fails before any request.
pub async fn login(session: &Session, credentials: &Credentials) -> Result<TokenBundle> {
    if session.is_cancelled() {
        return Err(HandshakeError::cancelled(None));
    }
    let started = Instant::now();
    debug!(handshake_id = %session.id(), "starting login handshake");

    let result = run_stages(session, credentials).await;
    match &result {
        Ok(_) => info!(
            handshake_id = %session.id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "login handshake completed"
        ),
        Err(e) => warn!(
            handshake_id = %session.id(),
            kind = %e.kind(),
            stage = ?e.failed_stage(),
            status = e.status(),
            "login handshake failed"
        ),
    }
    result
}

async fn run_stages(session: &Session, credentials: &Credentials) -> Result<TokenBundle> {
    let csrf = stages::obtain_csrf_token(session).await?;
    let authorization = stages::derive_authorization_url(session, &csrf).await?;
    debug!(
        handshake_id = %session.id(),
        status = authorization.status().as_u16(),
        "authorization url issued"
    );
    let state = stages::obtain_session_state(session, &authorization).await?;
    stages::verify_username(session, &state, credentials.username()).await?;
    stages::verify_password(session, &state, credentials).await?;
    stages::exchange_for_token(session, None).await
}

/// Entry point for callers: one fresh session per login.
///
/// # Example
/// ```no_run
/// use auth_handshake::auth::{Authenticator, Credentials};
/// use auth_handshake::config::HandshakeConfig;
///
/// # async fn example() -> auth_handshake::error::Result<()> {
/// let authenticator = Authenticator::new(HandshakeConfig::from_env());
/// let bundle = authenticator
///     .login(&Credentials::new("user@example.com", "secret"))
///     .await?;
/// println!("account {}", bundle.account_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    config: HandshakeConfig,
}

impl Authenticator {
    pub fn new(config: HandshakeConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(HandshakeConfig::from_env())
    }

    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<TokenBundle> {
        self.login_with_cancel(credentials, CancellationToken::new())
            .await
    }

    /// Log in, aborting as soon as `cancel` fires.
    pub async fn login_with_cancel(
        &self,
        credentials: &Credentials,
        cancel: CancellationToken,
    ) -> Result<TokenBundle> {
        if cancel.is_cancelled() {
            return Err(HandshakeError::cancelled(None));
        }
        let session = Session::new(&self.config)?.with_cancellation(cancel);
        login(&session, credentials).await
    }
}
