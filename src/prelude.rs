//! Convenience re-exports for common use.

pub use crate::auth::{Authenticator, Credentials, TokenBundle};
pub use crate::config::{HandshakeConfig, ProviderEndpoints};
pub use crate::error::{ErrorKind, HandshakeError, Result, Stage};
pub use tokio_util::sync::CancellationToken;
