//! CLI entry point.

pub mod commands;

use std::net::SocketAddr;

use clap::{Parser, Subcommand};

/// Login handshake CLI
#[derive(Parser, Debug)]
#[command(name = "auth-handshake", version, about = "Browser-emulated login handshake")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one login and print the token bundle as JSON
    Login(LoginArgs),
    /// Serve the login adapter over HTTP
    Serve(ServeArgs),
}

/// Arguments for `auth-handshake login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Account username
    #[arg(short, long)]
    pub username: String,

    /// Account password
    #[arg(short, long, env = "AUTH_HANDSHAKE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Abort the handshake after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Arguments for `auth-handshake serve`.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
