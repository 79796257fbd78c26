//! Browser-emulated login handshake.

pub mod classify;
pub mod credentials;
pub mod login;
pub mod session;
pub mod stages;
pub mod token;

pub use classify::BodyFormat;
pub use credentials::Credentials;
pub use login::{login, Authenticator};
pub use session::{Session, StageResponse};
pub use stages::{AuthorizationUrl, CsrfToken, SessionState};
pub use token::TokenBundle;
