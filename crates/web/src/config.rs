//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PESSOAS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `PESSOAS_HOST` - Bind address (default: 127.0.0.1)
//! - `PESSOAS_PORT` - Listen port (default: 3000)
//! - `PESSOAS_BASE_URL` - Public URL (default: <http://localhost:3000>); `https://` enables secure cookies
//! - `PESSOAS_LOGIN_PATH` - Where unauthenticated users are sent (default: /login)
//! - `PESSOAS_VERIFY_PATH` - Where unverified users are sent (default: /verify-email)
//! - `PESSOAS_ASSET_VERSION` - Client bundle version; a mismatch forces a full reload (default: 1)
//! - `PESSOAS_ASSET_ENTRY` - Script loaded by the HTML shell (default: /build/app.js)
//! - `PESSOAS_ASSETS_DIR` - Directory served under `/build` (default: public/build)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! ## Optional (TLS)
//! - `PESSOAS_TLS_CERT` - PEM-encoded certificate chain
//! - `PESSOAS_TLS_KEY` - PEM-encoded private key

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct PessoasConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the service
    pub base_url: String,
    /// Login page of the authentication layer
    pub login_path: String,
    /// E-mail verification notice of the authentication layer
    pub verify_path: String,
    /// Client asset configuration for the page shell
    pub assets: AssetConfig,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// Client-side view layer assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetConfig {
    /// Version string compared with the `X-Inertia-Version` request header
    pub version: String,
    /// Entry script referenced by the HTML shell
    pub entry: String,
    /// Directory with the built bundle
    pub dir: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            version: "1".to_owned(),
            entry: "/build/app.js".to_owned(),
            dir: "public/build".to_owned(),
        }
    }
}

/// TLS configuration for HTTPS.
///
/// Implements `Debug` manually to redact the private key.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[PEM]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        match (
            get_optional_env("PESSOAS_TLS_CERT"),
            get_optional_env("PESSOAS_TLS_KEY"),
        ) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "PESSOAS_TLS_*".to_string(),
                "Both PESSOAS_TLS_CERT and PESSOAS_TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

impl PessoasConfig {
    /// Configuration with every optional setting at its default.
    #[must_use]
    pub fn with_defaults(database_url: SecretString) -> Self {
        Self {
            database_url,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            login_path: "/login".to_owned(),
            verify_path: "/verify-email".to_owned(),
            assets: AssetConfig::default(),
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            tls: None,
        }
    }

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

        let defaults = Self::with_defaults(get_database_url("PESSOAS_DATABASE_URL")?);

        let host = get_optional_env("PESSOAS_HOST")
            .map(|v| v.parse::<IpAddr>())
            .transpose()
            .map_err(|e| ConfigError::InvalidEnvVar("PESSOAS_HOST".to_string(), e.to_string()))?
            .unwrap_or(defaults.host);
        let port = get_optional_env("PESSOAS_PORT")
            .map(|v| v.parse::<u16>())
            .transpose()
            .map_err(|e| ConfigError::InvalidEnvVar("PESSOAS_PORT".to_string(), e.to_string()))?
            .unwrap_or(defaults.port);

        let login_path = get_env_or_default("PESSOAS_LOGIN_PATH", &defaults.login_path);
        validate_path("PESSOAS_LOGIN_PATH", &login_path)?;
        let verify_path = get_env_or_default("PESSOAS_VERIFY_PATH", &defaults.verify_path);
        validate_path("PESSOAS_VERIFY_PATH", &verify_path)?;

        let assets = AssetConfig {
            version: get_env_or_default("PESSOAS_ASSET_VERSION", &defaults.assets.version),
            entry: get_env_or_default("PESSOAS_ASSET_ENTRY", &defaults.assets.entry),
            dir: get_env_or_default("PESSOAS_ASSETS_DIR", &defaults.assets.dir),
        };

        Ok(Self {
            host,
            port,
            base_url: get_env_or_default("PESSOAS_BASE_URL", &defaults.base_url),
            login_path,
            verify_path,
            assets,
            json_logs: get_optional_env("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_optional_env("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sentry_sample_rate),
            sentry_traces_sample_rate: get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sentry_traces_sample_rate),
            tls: TlsConfig::from_env()?,
            ..defaults
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Redirect targets must be local absolute paths.
fn validate_path(key: &str, path: &str) -> Result<(), ConfigError> {
    if !path.starts_with('/') || path.starts_with("//") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be a local path starting with '/' (got {path:?})"),
        ));
    }
    Ok(())
}
