//! Application configuration loaded from environment variables.
//!
//! All recognized keys are read once at process start into [`AppConfig`];
//! handlers never touch the process environment directly. The subset of
//! keys exposed through `/api/env-check` is declared in [`ENV_SCHEMA`],
//! where every key carries a trust level (server-only vs. client-visible)
//! and a secret tag that drives masking.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `SESSION_SECRET` - Session signing secret (min 32 chars)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3000)
//! - `BASE_URL` - Public URL of this app (default: http://localhost:3000)
//! - `NODE_ENV` - Runtime environment label (default: development)
//! - `DOMINO_API_URL` - Base URL of the Domino REST API
//! - `DOMINO_API_KEY` - Domino API key (server-only secret)
//! - `NEXT_PUBLIC_DOMINO_API_URL` - Client-visible Domino endpoint
//! - `NEXT_PUBLIC_DOMINO_API_KEY` - Client-visible (low privilege) Domino key
//! - `AUTH_VERIFY_URL` - Identity provider verification endpoint; login is
//!   disabled when unset
//! - `SENTRY_DSN` / `SENTRY_ENVIRONMENT` / `SENTRY_SAMPLE_RATE` /
//!   `SENTRY_TRACES_SAMPLE_RATE` - Error tracking

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use url::Url;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// How many characters of a secret are safe to show.
const MASK_PREFIX_LEN: usize = 8;

/// Appended to a masked secret in place of the remainder.
const TRUNCATION_MARKER: &str = "...";

/// Shown for any value that is not configured. Absence is a normal,
/// displayable state, not an error.
pub const NOT_CONFIGURED: &str = "未設定";

/// Substrings that mark a secret as a placeholder rather than a real value.
const PLACEHOLDER_PATTERNS: &[&str] = &["changeme", "placeholder", "example", "secret", "dummy"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of this app
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Runtime environment label (`NODE_ENV`)
    pub runtime_env: String,
    /// Domino integration endpoints and credentials
    pub domino: DominoConfig,
    /// External identity provider
    pub auth: AuthConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Domino API endpoints and credentials.
///
/// Implements `Debug` manually to redact the keys.
#[derive(Clone)]
pub struct DominoConfig {
    /// Base URL of the Domino REST API (server side)
    pub api_url: Option<String>,
    /// Domino API key (server-only, full privilege)
    pub api_key: Option<SecretString>,
    /// Client-visible Domino endpoint, if exposed
    pub public_api_url: Option<String>,
    /// Client-visible, low-privilege Domino key, if exposed
    pub public_api_key: Option<SecretString>,
}

impl std::fmt::Debug for DominoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DominoConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("public_api_url", &self.public_api_url)
            .field("public_api_key", &"[REDACTED]")
            .finish()
    }
}

/// External identity provider configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Verification endpoint for login assertions. `None` disables login.
    pub verify_url: Option<Url>,
}

// =============================================================================
// Diagnostics schema
// =============================================================================

/// Trust boundary of a configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trust {
    /// Full visibility for operators only.
    Server,
    /// Exposed to browser clients.
    Client,
}

/// A recognized diagnostics key: name, trust level, secret tag, and how to
/// read it from the loaded configuration.
pub struct EnvKey {
    pub name: &'static str,
    pub trust: Trust,
    pub secret: bool,
    read: fn(&AppConfig) -> Option<EnvValue<'_>>,
}

enum EnvValue<'a> {
    Plain(&'a str),
    Secret(&'a SecretString),
}

fn read_domino_api_url(config: &AppConfig) -> Option<EnvValue<'_>> {
    config.domino.api_url.as_deref().map(EnvValue::Plain)
}

fn read_domino_api_key(config: &AppConfig) -> Option<EnvValue<'_>> {
    config.domino.api_key.as_ref().map(EnvValue::Secret)
}

fn read_node_env(config: &AppConfig) -> Option<EnvValue<'_>> {
    Some(EnvValue::Plain(&config.runtime_env))
}

fn read_public_domino_api_url(config: &AppConfig) -> Option<EnvValue<'_>> {
    config.domino.public_api_url.as_deref().map(EnvValue::Plain)
}

fn read_public_domino_api_key(config: &AppConfig) -> Option<EnvValue<'_>> {
    config.domino.public_api_key.as_ref().map(EnvValue::Secret)
}

/// The fixed schema of keys exposed through `/api/env-check`.
///
/// The key names are the documented external interface and are preserved
/// verbatim from the original deployment.
pub const ENV_SCHEMA: &[EnvKey] = &[
    EnvKey {
        name: "DOMINO_API_URL",
        trust: Trust::Server,
        secret: false,
        read: read_domino_api_url,
    },
    EnvKey {
        name: "DOMINO_API_KEY",
        trust: Trust::Server,
        secret: true,
        read: read_domino_api_key,
    },
    EnvKey {
        name: "NODE_ENV",
        trust: Trust::Server,
        secret: false,
        read: read_node_env,
    },
    EnvKey {
        name: "NEXT_PUBLIC_DOMINO_API_URL",
        trust: Trust::Client,
        secret: false,
        read: read_public_domino_api_url,
    },
    EnvKey {
        name: "NEXT_PUBLIC_DOMINO_API_KEY",
        trust: Trust::Client,
        secret: true,
        read: read_public_domino_api_key,
    },
];

/// Read-only snapshot of the configuration, split by trust boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvDiagnostics {
    /// Full visibility grouping, for operators.
    pub server: BTreeMap<&'static str, String>,
    /// Public-exposed subset.
    pub client: BTreeMap<&'static str, String>,
}

/// Mask a secret to a safe-to-display prefix.
///
/// The result is at most [`MASK_PREFIX_LEN`] characters of the secret plus
/// the truncation marker; an absent secret renders as [`NOT_CONFIGURED`].
/// Never fails and never exposes the full value.
#[must_use]
pub fn mask_secret(secret: Option<&SecretString>) -> String {
    secret.map_or_else(
        || NOT_CONFIGURED.to_owned(),
        |secret| {
            let prefix: String = secret.expose_secret().chars().take(MASK_PREFIX_LEN).collect();
            format!("{prefix}{TRUNCATION_MARKER}")
        },
    )
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if secrets fail validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_secret("DATABASE_URL")?;
        let host = get_env_or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_owned(), e.to_string()))?;
        let base_url = get_env_or_default("BASE_URL", "http://localhost:3000");
        let session_secret = get_validated_secret("SESSION_SECRET")?;
        validate_session_secret(&session_secret, "SESSION_SECRET")?;

        let runtime_env = get_env_or_default("NODE_ENV", "development");
        let domino = DominoConfig::from_env()?;
        let auth = AuthConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            runtime_env,
            domino,
            auth,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether this is a production deployment.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.runtime_env == "production"
    }

    /// Build the read-only diagnostics snapshot from [`ENV_SCHEMA`].
    ///
    /// Idempotent; values tagged secret are masked, absent values render
    /// as [`NOT_CONFIGURED`].
    #[must_use]
    pub fn diagnostics(&self) -> EnvDiagnostics {
        let mut server = BTreeMap::new();
        let mut client = BTreeMap::new();
        for key in ENV_SCHEMA {
            let rendered = match (key.read)(self) {
                None => NOT_CONFIGURED.to_owned(),
                Some(EnvValue::Plain(value)) => value.to_owned(),
                Some(EnvValue::Secret(value)) => mask_secret(Some(value)),
            };
            match key.trust {
                Trust::Server => server.insert(key.name, rendered),
                Trust::Client => client.insert(key.name, rendered),
            };
        }
        EnvDiagnostics { server, client }
    }
}

impl DominoConfig {
    // Absence of any Domino key is a normal, displayable state (rendered as
    // the placeholder in diagnostics), not a startup failure; integrations
    // carry their own endpoint and credential.
    fn from_env() -> Result<Self, ConfigError> {
        let api_url = get_optional_env("DOMINO_API_URL");
        if let Some(raw) = &api_url {
            // Validate the URL shape up front; the raw string is kept for
            // the diagnostics payload.
            Url::parse(raw).map_err(|e| {
                ConfigError::InvalidEnvVar("DOMINO_API_URL".to_owned(), e.to_string())
            })?;
        }

        let api_key = match get_optional_env("DOMINO_API_KEY") {
            None => None,
            Some(raw) => {
                validate_secret_strength(&raw, "DOMINO_API_KEY")?;
                Some(SecretString::from(raw))
            }
        };

        Ok(Self {
            api_url,
            api_key,
            public_api_url: get_optional_env("NEXT_PUBLIC_DOMINO_API_URL"),
            public_api_key: get_optional_env("NEXT_PUBLIC_DOMINO_API_KEY").map(SecretString::from),
        })
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let verify_url = match get_optional_env("AUTH_VERIFY_URL") {
            None => None,
            Some(raw) => Some(Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("AUTH_VERIFY_URL".to_owned(), e.to_string())
            })?),
        };
        Ok(Self { verify_url })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    get_required_env(key).map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Reject secrets that are obviously placeholders.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            database_url: SecretString::from("postgres://localhost/itadaki"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            session_secret: SecretString::from("x".repeat(32)),
            runtime_env: "test".to_owned(),
            domino: DominoConfig {
                api_url: Some("https://api.domino.example".to_owned()),
                api_key: Some(SecretString::from("sk_live_abcdef123456")),
                public_api_url: None,
                public_api_key: None,
            },
            auth: AuthConfig { verify_url: None },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    #[test]
    fn test_mask_secret_shows_eight_char_prefix() {
        let secret = SecretString::from("sk_live_abcdef123456");
        assert_eq!(mask_secret(Some(&secret)), "sk_live_...");
    }

    #[test]
    fn test_mask_secret_short_values() {
        let secret = SecretString::from("abc");
        assert_eq!(mask_secret(Some(&secret)), "abc...");
    }

    #[test]
    fn test_mask_secret_empty_value() {
        let secret = SecretString::from("");
        assert_eq!(mask_secret(Some(&secret)), "...");
    }

    #[test]
    fn test_mask_secret_absent() {
        assert_eq!(mask_secret(None), NOT_CONFIGURED);
    }

    #[test]
    fn test_mask_secret_never_longer_than_prefix_plus_marker() {
        for len in 0..64 {
            let secret = SecretString::from("k".repeat(len));
            let masked = mask_secret(Some(&secret));
            assert!(masked.chars().count() <= MASK_PREFIX_LEN + TRUNCATION_MARKER.len());
            assert!(masked.ends_with(TRUNCATION_MARKER));
        }
    }

    #[test]
    fn test_diagnostics_groups_by_trust() {
        let diagnostics = test_config().diagnostics();
        assert_eq!(
            diagnostics.server.keys().copied().collect::<Vec<_>>(),
            vec!["DOMINO_API_KEY", "DOMINO_API_URL", "NODE_ENV"]
        );
        assert_eq!(
            diagnostics.client.keys().copied().collect::<Vec<_>>(),
            vec!["NEXT_PUBLIC_DOMINO_API_KEY", "NEXT_PUBLIC_DOMINO_API_URL"]
        );
    }

    #[test]
    fn test_diagnostics_masks_server_key() {
        let diagnostics = test_config().diagnostics();
        assert_eq!(diagnostics.server["DOMINO_API_KEY"], "sk_live_...");
        assert_eq!(
            diagnostics.server["DOMINO_API_URL"],
            "https://api.domino.example"
        );
        assert_eq!(diagnostics.server["NODE_ENV"], "test");
    }

    #[test]
    fn test_diagnostics_unconfigured_server_keys() {
        let mut config = test_config();
        config.domino.api_url = None;
        config.domino.api_key = None;
        let diagnostics = config.diagnostics();
        // Absence renders as the placeholder, it never errors
        assert_eq!(diagnostics.server["DOMINO_API_URL"], NOT_CONFIGURED);
        assert_eq!(diagnostics.server["DOMINO_API_KEY"], NOT_CONFIGURED);
    }

    #[test]
    fn test_diagnostics_unconfigured_client_keys() {
        let diagnostics = test_config().diagnostics();
        assert_eq!(diagnostics.client["NEXT_PUBLIC_DOMINO_API_URL"], NOT_CONFIGURED);
        assert_eq!(diagnostics.client["NEXT_PUBLIC_DOMINO_API_KEY"], NOT_CONFIGURED);
    }

    #[test]
    fn test_diagnostics_masks_client_key_when_present() {
        let mut config = test_config();
        config.domino.public_api_key = Some(SecretString::from("pk_live_xyz987654321"));
        let diagnostics = config.diagnostics();
        assert_eq!(diagnostics.client["NEXT_PUBLIC_DOMINO_API_KEY"], "pk_live_...");
    }

    #[test]
    fn test_diagnostics_never_contains_full_secret() {
        let diagnostics = test_config().diagnostics();
        for value in diagnostics.server.values().chain(diagnostics.client.values()) {
            assert!(!value.contains("abcdef123456"));
        }
    }

    #[test]
    fn test_schema_secret_tags() {
        let secret_keys: Vec<_> = ENV_SCHEMA
            .iter()
            .filter(|key| key.secret)
            .map(|key| key.name)
            .collect();
        assert_eq!(
            secret_keys,
            vec!["DOMINO_API_KEY", "NEXT_PUBLIC_DOMINO_API_KEY"]
        );
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
        assert!(validate_secret_strength("sk_live_abcdef123456", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST").is_err());
        let secret = SecretString::from("a".repeat(32));
        assert!(validate_session_secret(&secret, "TEST").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_domino_config_debug_redacts_secrets() {
        let config = test_config();
        let debug_output = format!("{:?}", config.domino);
        assert!(debug_output.contains("https://api.domino.example"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk_live_abcdef123456"));
    }
}
