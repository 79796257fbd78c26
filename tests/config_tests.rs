//! Tests for configuration loading.

use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use auth_handshake::config::{HandshakeConfig, ProviderEndpoints, DEFAULT_USER_AGENT};
use pretty_assertions::assert_eq;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 9] = [
    "AUTH_HANDSHAKE_CSRF_URL",
    "AUTH_HANDSHAKE_SIGNIN_URL",
    "AUTH_HANDSHAKE_IDENTITY_URL",
    "AUTH_HANDSHAKE_SESSION_URL",
    "AUTH_HANDSHAKE_USER_AGENT",
    "AUTH_HANDSHAKE_PROXY",
    "AUTH_HANDSHAKE_TIMEOUT_SECS",
    "AUTH_HANDSHAKE_REQUEST_TIMEOUT_SECS",
    "AUTH_HANDSHAKE_MAX_BODY_BYTES",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clear_config_env() {
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
}

#[test]
fn from_env_without_variables_uses_defaults() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    let config = HandshakeConfig::from_env();
    assert_eq!(config.endpoints, ProviderEndpoints::default());
    assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(config.proxy, None);
    assert_eq!(config.timeout, None);
    assert_eq!(config.request_timeout, Duration::from_secs(30));
}

#[test]
fn from_env_overrides_endpoints_and_timeouts() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    std::env::set_var("AUTH_HANDSHAKE_CSRF_URL", "http://app.test/csrf");
    std::env::set_var("AUTH_HANDSHAKE_SIGNIN_URL", "http://app.test/signin");
    std::env::set_var("AUTH_HANDSHAKE_IDENTITY_URL", "http://id.test/");
    std::env::set_var("AUTH_HANDSHAKE_SESSION_URL", "http://app.test/session");
    std::env::set_var("AUTH_HANDSHAKE_USER_AGENT", "custom-agent");
    std::env::set_var("AUTH_HANDSHAKE_TIMEOUT_SECS", "45");
    std::env::set_var("AUTH_HANDSHAKE_REQUEST_TIMEOUT_SECS", " 7 ");
    std::env::set_var("AUTH_HANDSHAKE_MAX_BODY_BYTES", "65536");

    let config = HandshakeConfig::from_env();
    assert_eq!(config.endpoints.csrf_url, "http://app.test/csrf");
    assert_eq!(config.endpoints.signin_url, "http://app.test/signin");
    assert_eq!(config.endpoints.identity_base_url, "http://id.test");
    assert_eq!(config.endpoints.session_url, "http://app.test/session");
    assert_eq!(config.user_agent, "custom-agent");
    assert_eq!(config.timeout, Some(Duration::from_secs(45)));
    assert_eq!(config.request_timeout, Duration::from_secs(7));
    assert_eq!(config.max_body_bytes, 65536);
}

#[test]
fn from_env_ignores_blank_proxy_and_bad_timeouts() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    std::env::set_var("AUTH_HANDSHAKE_PROXY", "  ");
    std::env::set_var("AUTH_HANDSHAKE_TIMEOUT_SECS", "soon");

    let config = HandshakeConfig::from_env();
    assert_eq!(config.proxy, None);
    assert_eq!(config.timeout, None);
}

#[test]
fn from_env_reads_proxy() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    std::env::set_var("AUTH_HANDSHAKE_PROXY", "http://proxy.test:3128");

    let config = HandshakeConfig::from_env();
    assert_eq!(config.proxy.as_deref(), Some("http://proxy.test:3128"));
    assert!(config.build_client().is_ok());
}

#[test]
fn username_url_follows_identity_override() {
    let endpoints = ProviderEndpoints::default().with_identity_base_url("http://id.test/");
    let url = endpoints.username_check_url("abc").unwrap();
    assert_eq!(url.as_str(), "http://id.test/u/login/identifier?state=abc");
}
