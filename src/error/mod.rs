//! Error types for the login handshake.

pub mod unified;

pub use unified::{ErrorCategory, ErrorKind, RecoverySuggestion, Stage};

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Status used when the body of a successful response could not be read as
/// the stage expected.
pub const STATUS_UNPARSEABLE: u16 = 500;
/// Status used for transport failures (no provider response).
pub const STATUS_TRANSPORT: u16 = 502;
/// Status used when the caller cancelled the handshake.
pub const STATUS_CANCELLED: u16 = 499;
/// Status used when the handshake deadline elapsed.
pub const STATUS_DEADLINE: u16 = 504;

/// Failure of a single handshake.
///
/// The provider's status code and message are kept intact wherever the
/// provider supplied them, so callers can tell a rejected password from an
/// outage.
#[derive(Error, Debug)]
#[error("{kind} (status {status}): {message}")]
pub struct HandshakeError {
    kind: ErrorKind,
    stage: Option<Stage>,
    status: u16,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl HandshakeError {
    /// Provider-attributed failure of a stage.
    pub fn stage(stage: Stage, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: stage.error_kind(),
            stage: Some(stage),
            status,
            message: message.into(),
            source: None,
        }
    }

    /// A body the stage could not interpret.
    pub fn unparseable(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::ResponseUnparseable,
            stage: Some(stage),
            status: STATUS_UNPARSEABLE,
            message: message.into(),
            source: None,
        }
    }

    /// The request never produced a response.
    pub fn transport(stage: Option<Stage>, source: reqwest::Error) -> Self {
        let message = match stage {
            Some(stage) => stage.fallback_message().to_string(),
            None => format!("HTTP client error: {source}"),
        };
        Self {
            kind: ErrorKind::Transport,
            stage,
            status: STATUS_TRANSPORT,
            message,
            source: Some(Box::new(source)),
        }
    }

    /// The caller cancelled the handshake.
    pub fn cancelled(stage: Option<Stage>) -> Self {
        Self {
            kind: ErrorKind::Cancelled,
            stage,
            status: STATUS_CANCELLED,
            message: "Login was cancelled.".to_string(),
            source: None,
        }
    }

    /// The handshake deadline elapsed.
    pub fn deadline_exceeded(stage: Option<Stage>) -> Self {
        Self {
            kind: ErrorKind::Cancelled,
            stage,
            status: STATUS_DEADLINE,
            message: "Login deadline exceeded.".to_string(),
            source: None,
        }
    }

    /// Attach an underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Stage that failed, if the failure happened inside one.
    pub fn failed_stage(&self) -> Option<Stage> {
        self.stage
    }

    /// HTTP status, provider-supplied when the provider answered.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self.kind {
            ErrorKind::Cancelled => ErrorCategory::Cancelled,
            ErrorKind::Transport => ErrorCategory::Network,
            ErrorKind::ResponseUnparseable => ErrorCategory::Protocol,
            _ => match self.status {
                401 | 403 => ErrorCategory::Authentication,
                400 | 404 | 422 => match self.kind {
                    ErrorKind::UsernameCheck | ErrorKind::PasswordCheck => {
                        ErrorCategory::Authentication
                    }
                    _ => ErrorCategory::Protocol,
                },
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Protocol,
            },
        }
    }

    /// Whether a fresh handshake from the top could plausibly succeed.
    ///
    /// Provider state is single-use, so retrying means calling login again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server
        ) || (self.kind == ErrorKind::Cancelled && self.status == STATUS_DEADLINE)
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit => RecoverySuggestion::RetryLater,
            ErrorCategory::Network | ErrorCategory::Server => {
                RecoverySuggestion::RetryWithBackoff
            }
            ErrorCategory::Cancelled if self.status == STATUS_DEADLINE => {
                RecoverySuggestion::IncreaseTimeout
            }
            ErrorCategory::Cancelled => RecoverySuggestion::None,
            ErrorCategory::Protocol => RecoverySuggestion::CheckProviderContract,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, HandshakeError>;
