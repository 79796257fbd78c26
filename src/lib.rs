//! Browser-emulated login against a hosted identity provider.
//!
//! Replays the requests a browser makes when a person signs in through the
//! provider's login pages (CSRF token, authorization URL, state token,
//! username check, password check, session read) and returns the issued
//! tokens or a typed error carrying the provider's status and message.
//!
//! # Quick Start
//!
//! ```no_run
//! use auth_handshake::prelude::*;
//!
//! # async fn example() -> auth_handshake::error::Result<()> {
//! let authenticator = Authenticator::new(HandshakeConfig::from_env());
//! let bundle = authenticator.login(&Credentials::new("user", "password")).await?;
//! println!("{}", bundle.account_id);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod prelude;
pub mod util;

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "cli")]
pub mod cli;
