//! HTTP adapter exposing the login operation.
//!
//! A boundary translator only: it decodes the request body, calls
//! [`Authenticator::login`] and encodes the outcome.
//!
//! ```no_run
//! use auth_handshake::auth::Authenticator;
//!
//! # async fn example() -> std::io::Result<()> {
//! let addr = "127.0.0.1:8080".parse().unwrap();
//! auth_handshake::server::serve(Authenticator::from_env(), addr).await
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::{Authenticator, Credentials};
use crate::error::{ErrorKind, HandshakeError};

/// Message returned when the request body is not a valid login request.
pub const PARSE_USER_INFO_MESSAGE: &str = "Failed to parse user info.";

/// Error body returned by the adapter.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub error_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl ErrorPayload {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            error_message: message.into(),
            error_kind: None,
        }
    }

    fn from_error(error: &HandshakeError) -> Self {
        let kind: &'static str = error.kind().into();
        Self {
            error_message: error.message().to_string(),
            error_kind: Some(kind.to_string()),
        }
    }
}

/// Router with `POST /auth/login`.
pub fn router(authenticator: Authenticator) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .with_state(Arc::new(authenticator))
}

/// Bind `addr` and serve the router until the process exits.
pub async fn serve(authenticator: Authenticator, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "login adapter listening");
    axum::serve(listener, router(authenticator)).await
}

async fn login(
    State(authenticator): State<Arc<Authenticator>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Response {
    let Json(credentials) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected login body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorPayload::message(PARSE_USER_INFO_MESSAGE)),
            )
                .into_response();
        }
    };

    match authenticator.login(&credentials).await {
        Ok(bundle) => Json(bundle).into_response(),
        Err(error) => error.into_response(),
    }
}

impl IntoResponse for HandshakeError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or_else(|_| {
            if self.kind() == ErrorKind::Cancelled {
                StatusCode::GATEWAY_TIMEOUT
            } else {
                StatusCode::BAD_GATEWAY
            }
        });
        (status, Json(ErrorPayload::from_error(&self))).into_response()
    }
}
