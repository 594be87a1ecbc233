//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `SLACK_BOT_TOKEN` - Slack bot token (xoxb-...)
//! - `SLACK_SIGNING_SECRET` - Slack app signing secret
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8080)
//! - `ISSUE_TABLE` - Table issue reports are written to (default: `issue_reports`)
//! - `SLACK_COMMAND` - Slash command handled by the service (default: `/logerror`)
//! - `SLACK_VERIFY_EVENTS` - Verify signatures on event callbacks too (default: true)
//! - `SIGNATURE_MAX_AGE_SECS` - Replay window for signed requests, `0` disables (default: 300)
//! - `NER_URL` - Entity recognizer endpoint; unset disables entity extraction
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sample rates (default: 1.0)
//! - `LOG_FORMAT` - `json` for structured logs, text otherwise

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::db::TableName;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_ISSUE_TABLE: &str = "issue_reports";
const DEFAULT_COMMAND: &str = "/logerror";
const DEFAULT_SIGNATURE_MAX_AGE_SECS: u64 = 300;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

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

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Table issue reports are written to
    pub issue_table: TableName,
    /// Slack configuration
    pub slack: SlackConfig,
    /// Entity recognizer endpoint (optional)
    pub ner_url: Option<Url>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// Emit JSON logs instead of text
    pub log_json: bool,
}

/// Slack configuration.
///
/// Implements `Debug` manually to redact secrets.
#[derive(Clone)]
pub struct SlackConfig {
    /// Slack bot token (xoxb-...).
    pub bot_token: SecretString,
    /// Slack app signing secret for request verification.
    pub signing_secret: SecretString,
    /// Slash command handled by the service, including the slash.
    pub command: String,
    /// Whether event callbacks (not only slash commands) are verified.
    pub verify_events: bool,
    /// Maximum age of a signed request. `None` disables the replay check.
    pub signature_max_age: Option<Duration>,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"[REDACTED]")
            .field("signing_secret", &"[REDACTED]")
            .field("command", &self.command)
            .field("verify_events", &self.verify_events)
            .field("signature_max_age", &self.signature_max_age)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("DATABASE_URL")?);
        let host = get_env_or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let issue_table = TableName::parse(&get_env_or_default("ISSUE_TABLE", DEFAULT_ISSUE_TABLE))
            .map_err(|e| ConfigError::InvalidEnvVar("ISSUE_TABLE".to_string(), e.to_string()))?;

        let slack = SlackConfig::from_env()?;

        let ner_url = get_optional_env("NER_URL")
            .map(|raw| {
                Url::parse(&raw)
                    .map_err(|e| ConfigError::InvalidEnvVar("NER_URL".to_string(), e.to_string()))
            })
            .transpose()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let log_json = get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        Ok(Self {
            database_url,
            host,
            port,
            issue_table,
            slack,
            ner_url,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            log_json,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SlackConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let bot_token = get_required_env("SLACK_BOT_TOKEN")?;
        let signing_secret = get_required_env("SLACK_SIGNING_SECRET")?;

        // Weak secrets are reported but do not stop the service
        if let Err(e) = validate_secret_strength(&bot_token, "SLACK_BOT_TOKEN") {
            tracing::warn!("SLACK_BOT_TOKEN validation warning: {e}");
        }
        if let Err(e) = validate_secret_strength(&signing_secret, "SLACK_SIGNING_SECRET") {
            tracing::warn!("SLACK_SIGNING_SECRET validation warning: {e}");
        }

        let command = get_env_or_default("SLACK_COMMAND", DEFAULT_COMMAND);
        if !command.starts_with('/') || command.len() < 2 {
            return Err(ConfigError::InvalidEnvVar(
                "SLACK_COMMAND".to_string(),
                "must start with '/' followed by the command name".to_string(),
            ));
        }

        let verify_events = get_optional_env("SLACK_VERIFY_EVENTS")
            .map(|raw| parse_bool("SLACK_VERIFY_EVENTS", &raw))
            .transpose()?
            .unwrap_or(true);

        let max_age_secs = get_optional_env("SIGNATURE_MAX_AGE_SECS")
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("SIGNATURE_MAX_AGE_SECS".to_string(), e.to_string())
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_SIGNATURE_MAX_AGE_SECS);

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            signing_secret: SecretString::from(signing_secret),
            command,
            verify_events,
            signature_max_age: max_age_from_secs(max_age_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a boolean flag value.
fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// `0` disables the replay window.
const fn max_age_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
