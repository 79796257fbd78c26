use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tokens issued by a successful handshake.
///
/// Serialized with camelCase keys, which is also the shape returned by the
/// HTTP adapter.
///
/// # Example
/// ```no_run
/// use auth_handshake::auth::TokenBundle;
///
/// let bundle = TokenBundle {
///     access_token: "access".to_string(),
///     refresh_token: "refresh".to_string(),
///     account_id: "user-123".to_string(),
///     expires_at: None,
/// };
/// let json = serde_json::to_string(&bundle)?;
/// assert!(json.contains("\"accessToken\""));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}
