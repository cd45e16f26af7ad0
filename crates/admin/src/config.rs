//! Back-office configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PANTRY_API_URL` - Base URL of the back-office API
//! - `PANTRY_API_TOKEN` - Bearer token for the API (high entropy, not a placeholder)
//!
//! ## Optional
//! - `PANTRY_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `PANTRY_BULK_CONCURRENCY` - Parallel requests per bulk operation (default: 8)
//! - `PANTRY_IDEMPOTENT_ASSIGN` - Generate an idempotency key for every
//!   supplier assignment (default: false)

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: &str = "30";
const DEFAULT_BULK_CONCURRENCY: &str = "8";
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

/// Back-office application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Back-office API connection
    pub api: ApiConfig,
    /// Maximum number of requests in flight during a bulk operation
    pub bulk_concurrency: usize,
    /// Attach a generated idempotency key to every supplier assignment
    pub idempotent_assign: bool,
}

/// Back-office API connection settings.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// API base URL
    pub base_url: Url,
    /// Bearer token
    pub token: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`AdminConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api = ApiConfig::from_lookup(&lookup)?;

        let bulk_concurrency =
            get_or_default(&lookup, "PANTRY_BULK_CONCURRENCY", DEFAULT_BULK_CONCURRENCY)
                .parse::<usize>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("PANTRY_BULK_CONCURRENCY".to_string(), e.to_string())
                })?;
        if bulk_concurrency == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PANTRY_BULK_CONCURRENCY".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let idempotent_assign = lookup("PANTRY_IDEMPOTENT_ASSIGN")
            .map(|v| parse_bool("PANTRY_IDEMPOTENT_ASSIGN", &v))
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            api,
            bulk_concurrency,
            idempotent_assign,
        })
    }

    /// Returns a reference to the API configuration.
    #[must_use]
    pub const fn api(&self) -> &ApiConfig {
        &self.api
    }
}

impl ApiConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = get_required(lookup, "PANTRY_API_URL")?;
        let base_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("PANTRY_API_URL".to_string(), e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "PANTRY_API_URL".to_string(),
                format!("unsupported scheme '{}'", base_url.scheme()),
            ));
        }

        let token = get_required(lookup, "PANTRY_API_TOKEN")?;
        validate_secret_strength(&token, "PANTRY_API_TOKEN")?;

        let timeout_secs = get_or_default(lookup, "PANTRY_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PANTRY_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            token: SecretString::from(token),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
fn get_required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a variable with a default value.
fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued by the API."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const GOOD_TOKEN: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
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
        let result = validate_secret_strength("your-api-token-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength(GOOD_TOKEN, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = AdminConfig::from_lookup(lookup_from(&[
            ("PANTRY_API_URL", "https://api.pantry.test/v1"),
            ("PANTRY_API_TOKEN", GOOD_TOKEN),
        ]))
        .unwrap();

        assert_eq!(config.api().base_url.as_str(), "https://api.pantry.test/v1");
        assert_eq!(config.api().timeout, Duration::from_secs(30));
        assert_eq!(config.bulk_concurrency, 8);
        assert!(!config.idempotent_assign);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = AdminConfig::from_lookup(lookup_from(&[
            ("PANTRY_API_URL", "http://localhost:8080"),
            ("PANTRY_API_TOKEN", GOOD_TOKEN),
            ("PANTRY_HTTP_TIMEOUT_SECS", "5"),
            ("PANTRY_BULK_CONCURRENCY", "2"),
            ("PANTRY_IDEMPOTENT_ASSIGN", "true"),
        ]))
        .unwrap();

        assert_eq!(config.api().timeout, Duration::from_secs(5));
        assert_eq!(config.bulk_concurrency, 2);
        assert!(config.idempotent_assign);
    }

    #[test]
    fn test_from_lookup_missing_url() {
        let result = AdminConfig::from_lookup(lookup_from(&[("PANTRY_API_TOKEN", GOOD_TOKEN)]));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "PANTRY_API_URL"));
    }

    #[test]
    fn test_from_lookup_rejects_zero_concurrency() {
        let result = AdminConfig::from_lookup(lookup_from(&[
            ("PANTRY_API_URL", "http://localhost:8080"),
            ("PANTRY_API_TOKEN", GOOD_TOKEN),
            ("PANTRY_BULK_CONCURRENCY", "0"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_from_lookup_rejects_bad_scheme() {
        let result = AdminConfig::from_lookup(lookup_from(&[
            ("PANTRY_API_URL", "ftp://files.pantry.test"),
            ("PANTRY_API_TOKEN", GOOD_TOKEN),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_api_config_debug_redacts_token() {
        let config = ApiConfig {
            base_url: Url::parse("https://api.pantry.test").unwrap(),
            token: SecretString::from("super_secret_api_token"),
            timeout: Duration::from_secs(30),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("api.pantry.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_token"));
    }
}
