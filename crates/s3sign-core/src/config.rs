//! Environment-driven configuration.
//!
//! Provides [`SignConfig`], the settings an application reads once during
//! startup. Keys are deliberately not part of it: they are loaded by
//! `s3sign_auth::Keys::from_env` so they never end up in a serializable struct.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default S3 endpoint domain used to detect virtual-hosted bucket names.
pub const DEFAULT_DOMAIN: &str = "s3.amazonaws.com";

/// Startup configuration for applications using the signing transport.
///
/// # Examples
///
/// ```
/// use s3sign_core::SignConfig;
///
/// let config = SignConfig::default();
/// assert_eq!(config.s3_domain, "s3.amazonaws.com");
/// assert!(config.register_default);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct SignConfig {
    /// Endpoint domain; hosts of the form `<bucket>.<domain>` are signed as
    /// virtual-hosted buckets.
    #[builder(default = String::from(DEFAULT_DOMAIN))]
    pub s3_domain: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Whether to register the signing transport under the `s3` scheme at startup.
    #[builder(default = true)]
    pub register_default: bool,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            s3_domain: String::from(DEFAULT_DOMAIN),
            log_level: String::from("info"),
            register_default: true,
        }
    }
}

impl SignConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `S3_DOMAIN` | `s3.amazonaws.com` |
    /// | `LOG_LEVEL` | `info` |
    /// | `S3_REGISTER_DEFAULT` | `true` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("S3_DOMAIN") {
            if !v.is_empty() {
                config.s3_domain = v.to_ascii_lowercase();
            }
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("S3_REGISTER_DEFAULT") {
            config.register_default = parse_bool(&v);
        }

        config
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
