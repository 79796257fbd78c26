//! CLI command handlers.

use std::time::Duration;

use crate::auth::{Authenticator, Credentials};
use crate::config::HandshakeConfig;

use super::{LoginArgs, ServeArgs};

/// Handle `auth-handshake login`.
pub async fn handle_login(args: LoginArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = HandshakeConfig::from_env();
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let credentials = Credentials::new(args.username, args.password);

    let cancel = tokio_util::sync::CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let bundle = Authenticator::new(config)
        .login_with_cancel(&credentials, cancel)
        .await?;
    println!("{}", serde_json::to_string_pretty(&bundle)?);
    Ok(())
}

/// Handle `auth-handshake serve`.
pub async fn handle_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    crate::server::serve(Authenticator::from_env(), args.bind).await?;
    Ok(())
}
