//! auth-handshake CLI binary entry point.

use auth_handshake::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse_args();

    let result = match cli.command {
        Commands::Login(args) => auth_handshake::cli::commands::handle_login(args).await,
        Commands::Serve(args) => auth_handshake::cli::commands::handle_serve(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("auth_handshake=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
