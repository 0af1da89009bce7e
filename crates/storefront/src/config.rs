//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STORE_BACKEND_URL` - Base URL of the store backend gateway
//! - `STORE_IDENTITY_PROVIDER_URL` - Identity provider sign-in page
//! - `STORE_IDENTITY_SECRET` - Key shared with the provider for signing assertions
//!
//! ## Optional
//! - `STORE_HOST` - Bind address (default: 127.0.0.1)
//! - `STORE_PORT` - Listen port (default: 3000)
//! - `STORE_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `STORE_BACKEND_API_KEY` - Bearer key sent to the backend gateway
//! - `STORE_BACKEND_TIMEOUT_SECS` - Backend request timeout (default: 30)
//! - `STORE_QUERY_CACHE_TTL_SECS` - Query cache time-to-live (default: 300)
//! - `STORE_QUERY_CACHE_CAPACITY` - Query cache entry limit (default: 1000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Store backend connection settings
    pub backend: BackendConfig,
    /// Identity provider settings
    pub identity: IdentityConfig,
    /// Query cache settings
    pub query_cache: QueryCacheConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Store backend connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Gateway base URL; operations are posted to `{url}/{operation}`
    pub url: Url,
    /// Optional bearer key for the gateway
    pub api_key: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Identity provider settings.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Provider sign-in page; `return_to` is appended
    pub provider_url: Url,
    /// Key the provider signs identity assertions with
    pub secret: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("provider_url", &self.provider_url.as_str())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Query cache settings.
#[derive(Debug, Clone, Copy)]
pub struct QueryCacheConfig {
    /// How long a cached read stays fresh
    pub ttl: Duration,
    /// Maximum number of cached reads
    pub capacity: u64,
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            capacity: 1000,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the backend API key fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("STORE_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STORE_PORT", "3000")?;
        let base_url = parse_url(
            "STORE_BASE_URL",
            &get_env_or_default("STORE_BASE_URL", "http://localhost:3000"),
        )?;

        Ok(Self {
            host,
            port,
            base_url,
            backend: BackendConfig::from_env()?,
            identity: IdentityConfig::from_env()?,
            query_cache: QueryCacheConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

impl BackendConfig {
    /// Load backend settings from environment variables.
    ///
    /// Shared with the CLI, which talks to the same backend.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `STORE_BACKEND_URL` is missing or invalid, or
    /// if the API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = parse_url("STORE_BACKEND_URL", &get_required_env("STORE_BACKEND_URL")?)?;
        let api_key = match get_optional_env("STORE_BACKEND_API_KEY") {
            Some(value) => {
                validate_secret_strength(&value, "STORE_BACKEND_API_KEY")?;
                Some(SecretString::from(value))
            }
            None => None,
        };
        let timeout_secs = parse_env_or_default::<u64>("STORE_BACKEND_TIMEOUT_SECS", "30")?;

        Ok(Self {
            url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let provider_url = parse_url(
            "STORE_IDENTITY_PROVIDER_URL",
            &get_required_env("STORE_IDENTITY_PROVIDER_URL")?,
        )?;
        let secret = get_required_env("STORE_IDENTITY_SECRET")?;
        validate_secret_strength(&secret, "STORE_IDENTITY_SECRET")?;

        Ok(Self {
            provider_url,
            secret: SecretString::from(secret),
        })
    }
}

impl QueryCacheConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let ttl_secs = parse_env_or_default::<u64>(
            "STORE_QUERY_CACHE_TTL_SECS",
            &defaults.ttl.as_secs().to_string(),
        )?;
        let capacity = parse_env_or_default::<u64>(
            "STORE_QUERY_CACHE_CAPACITY",
            &defaults.capacity.to_string(),
        )?;

        Ok(Self {
            ttl: Duration::from_secs(ttl_secs),
            capacity,
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
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default string.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a URL-valued variable.
fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
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
    let len = s.chars().count() as f64;
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

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: Url::parse("http://localhost:3000").unwrap(),
            backend: BackendConfig {
                url: Url::parse("http://127.0.0.1:4943/api/").unwrap(),
                api_key: Some(SecretString::from("super_private_gateway_key")),
                timeout: Duration::from_secs(30),
            },
            identity: IdentityConfig {
                provider_url: Url::parse("https://id.example.org/authorize").unwrap(),
                secret: SecretString::from("shared_provider_signing_key"),
            },
            query_cache: QueryCacheConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_url_rejects_garbage() {
        let result = parse_url("STORE_BACKEND_URL", "not a url");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "STORE_BACKEND_URL"));
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure_follows_scheme() {
        let mut config = test_config();
        assert!(!config.is_secure());
        config.base_url = Url::parse("https://store.example.org").unwrap();
        assert!(config.is_secure());
    }

    #[test]
    fn test_identity_config_debug_redacts_secret() {
        let debug_output = format!("{:?}", test_config().identity);
        assert!(debug_output.contains("id.example.org"));
        assert!(!debug_output.contains("shared_provider_signing_key"));
    }

    #[test]
    fn test_backend_config_debug_redacts_key() {
        let debug_output = format!("{:?}", test_config().backend);
        assert!(debug_output.contains("127.0.0.1:4943"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_private_gateway_key"));
    }
}
