//! Error classification shared by the stages and the adapters.

use serde::Serialize;
use strum::{Display, EnumString, IntoStaticStr};

/// One kind per stage failure plus the transport, parse and cancellation
/// kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize)]
pub enum ErrorKind {
    #[strum(serialize = "csrf-error")]
    #[serde(rename = "csrf-error")]
    Csrf,
    #[strum(serialize = "authorization-url-error")]
    #[serde(rename = "authorization-url-error")]
    AuthorizationUrl,
    #[strum(serialize = "session-state-error")]
    #[serde(rename = "session-state-error")]
    SessionState,
    #[strum(serialize = "username-check-error")]
    #[serde(rename = "username-check-error")]
    UsernameCheck,
    #[strum(serialize = "password-check-error")]
    #[serde(rename = "password-check-error")]
    PasswordCheck,
    #[strum(serialize = "token-exchange-error")]
    #[serde(rename = "token-exchange-error")]
    TokenExchange,
    #[strum(serialize = "response-unparseable")]
    #[serde(rename = "response-unparseable")]
    ResponseUnparseable,
    #[strum(serialize = "transport-error")]
    #[serde(rename = "transport-error")]
    Transport,
    #[strum(serialize = "cancelled")]
    #[serde(rename = "cancelled")]
    Cancelled,
}

/// The six handshake stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Stage {
    Csrf,
    AuthorizationUrl,
    SessionState,
    UsernameCheck,
    PasswordCheck,
    TokenExchange,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Csrf,
        Stage::AuthorizationUrl,
        Stage::SessionState,
        Stage::UsernameCheck,
        Stage::PasswordCheck,
        Stage::TokenExchange,
    ];

    pub fn error_kind(self) -> ErrorKind {
        match self {
            Stage::Csrf => ErrorKind::Csrf,
            Stage::AuthorizationUrl => ErrorKind::AuthorizationUrl,
            Stage::SessionState => ErrorKind::SessionState,
            Stage::UsernameCheck => ErrorKind::UsernameCheck,
            Stage::PasswordCheck => ErrorKind::PasswordCheck,
            Stage::TokenExchange => ErrorKind::TokenExchange,
        }
    }

    /// Message used when the provider's response carries none.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Stage::Csrf => "Failed to get CSRF token.",
            Stage::AuthorizationUrl => "Failed to get authorized url.",
            Stage::SessionState => "Failed to get state.",
            Stage::UsernameCheck => "Failed to check username.",
            Stage::PasswordCheck => "Failed to check password.",
            Stage::TokenExchange => "Failed to get access token.",
        }
    }
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Server,
    Network,
    Cancelled,
    Protocol,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    CheckCredentials,
    RetryLater,
    RetryWithBackoff,
    IncreaseTimeout,
    CheckProviderContract,
    None,
}
