//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FARMAUP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `FARMAUP_API_TOKEN` - Bearer token clients must present (falls back to `API_TOKEN`)
//!
//! ## Optional
//! - `FARMAUP_HOST` - Bind address (default: 127.0.0.1)
//! - `FARMAUP_PORT` - Listen port (falls back to `PORT`, default: 3000)
//! - `FARMAUP_ENV` - `development` or `production` (default: production)
//! - `FARMAUP_LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Environment name reported to Sentry

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "put-your",
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

/// Deployment mode.
///
/// Development mode adds the full error chain to error responses as `detail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Returns `true` in development mode.
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("expected development or production, got {other:?}")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected text or json, got {other:?}")),
        }
    }
}

/// API application configuration.
///
/// Secrets are held in `SecretString`, so `Debug` output redacts them.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Token expected in `Authorization: Bearer <token>`
    pub api_token: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deployment mode
    pub environment: Environment,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the API token looks like a placeholder outside development mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ApiConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let environment: Environment = env.parse_or_default("FARMAUP_ENV")?;
        let database_url = env.required_secret("FARMAUP_DATABASE_URL", "DATABASE_URL")?;
        let api_token = env.required_secret("FARMAUP_API_TOKEN", "API_TOKEN")?;
        validate_api_token(&api_token, environment)?;

        let host = env
            .get("FARMAUP_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_owned())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("FARMAUP_HOST".to_owned(), e.to_string()))?;
        let port = env
            .get("FARMAUP_PORT")
            .or_else(|| env.get("PORT"))
            .unwrap_or_else(|| "3000".to_owned())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("FARMAUP_PORT".to_owned(), e.to_string()))?;

        Ok(Self {
            database_url,
            api_token,
            host,
            port,
            environment,
            log_format: env.parse_or_default("FARMAUP_LOG_FORMAT")?,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a variable, treating empty values as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required secret with a fallback key.
    fn required_secret(&self, primary: &str, fallback: &str) -> Result<SecretString, ConfigError> {
        self.get(primary)
            .or_else(|| self.get(fallback))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary.to_owned()))
    }

    /// Parse an optional variable, using the type's default when unset.
    fn parse_or_default<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr<Err = String> + Default,
    {
        self.get(key).map_or_else(
            || Ok(T::default()),
            |v| {
                v.parse()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e))
            },
        )
    }
}

/// Reject placeholder tokens outside development mode.
fn validate_api_token(token: &SecretString, environment: Environment) -> Result<(), ConfigError> {
    if environment.is_development() {
        return Ok(());
    }

    let lower = token.expose_secret().to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                "FARMAUP_API_TOKEN".to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}
