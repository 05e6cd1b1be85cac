//! Configuration module for environment variable parsing.
//!
//! All settings are read once at startup into an explicit [`Config`] that is
//! handed to the verifier and the router. Nothing inside the crate reads the
//! process environment after that.

use std::env;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::warn;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default per-request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Default maximum request body size (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Browser origins allowed by default to call the API with credentials.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "https://sirens-fortune-xr3h.bolt.host",
    "http://localhost:5173",
    "http://localhost:3000",
];

/// Application configuration loaded from environment variables.
#[derive(Debug)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Shared HMAC secret for webhook signature verification.
    /// `None` means verification is bypassed.
    pub webhook_secret: Option<SecretString>,

    /// Refuse to start when no webhook secret is configured
    pub require_webhook_secret: bool,

    /// Per-request timeout imposed by the HTTP boundary
    pub request_timeout_ms: u64,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,

    /// Origins allowed to make credentialed cross-origin requests
    pub cors_origins: Vec<String>,
}

/// Startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HELIO_WEBHOOK_SECRET must be set when REQUIRE_WEBHOOK_SECRET is enabled")]
    MissingWebhookSecret,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            port: parse_or("PORT", &lookup, DEFAULT_PORT),

            webhook_secret: lookup("HELIO_WEBHOOK_SECRET")
                .filter(|s| !s.trim().is_empty())
                .map(SecretString::new),

            require_webhook_secret: lookup("REQUIRE_WEBHOOK_SECRET")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),

            request_timeout_ms: parse_or(
                "REQUEST_TIMEOUT_MS",
                &lookup,
                DEFAULT_REQUEST_TIMEOUT_MS,
            ),

            max_body_bytes: parse_or("MAX_BODY_BYTES", &lookup, DEFAULT_MAX_BODY_BYTES),

            cors_origins: parse_csv("CORS_ORIGINS", &lookup).unwrap_or_else(|| {
                DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()
            }),
        }
    }

    /// Check startup invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.require_webhook_secret && self.webhook_secret.is_none() {
            return Err(ConfigError::MissingWebhookSecret);
        }
        Ok(())
    }

    /// The configured secret, if any.
    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
    }
}

/// Parse a variable, falling back to `default` when absent or invalid.
fn parse_or<T, F>(name: &str, lookup: &F, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = match lookup(name) {
        Some(v) => v,
        None => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv<F>(name: &str, lookup: &F) -> Option<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.webhook_secret.is_none());
        assert!(!config.require_webhook_secret);
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.cors_origins, DEFAULT_CORS_ORIGINS);
    }

    #[test]
    fn test_cors_origins_override() {
        let config = config_from(&[(
            "CORS_ORIGINS",
            "https://app.example.com, ,http://localhost:8080",
        )]);
        assert_eq!(
            config.cors_origins,
            vec!["https://app.example.com", "http://localhost:8080"]
        );

        let config = config_from(&[("CORS_ORIGINS", "")]);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = config_from(&[("PORT", "not-a-port")]);
        assert_eq!(config.port, DEFAULT_PORT);

        let config = config_from(&[("PORT", " 8080 ")]);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_blank_secret_is_unset() {
        let config = config_from(&[("HELIO_WEBHOOK_SECRET", "   ")]);
        assert!(config.webhook_secret().is_none());

        let config = config_from(&[("HELIO_WEBHOOK_SECRET", "whsec_123")]);
        assert_eq!(config.webhook_secret(), Some("whsec_123"));
    }

    #[test]
    fn test_validate_requires_secret() {
        let config = config_from(&[("REQUIRE_WEBHOOK_SECRET", "true")]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingWebhookSecret)
        ));

        let config = config_from(&[
            ("REQUIRE_WEBHOOK_SECRET", "1"),
            ("HELIO_WEBHOOK_SECRET", "whsec_123"),
        ]);
        assert!(config.validate().is_ok());

        let config = config_from(&[]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool(" yes "));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }
}
