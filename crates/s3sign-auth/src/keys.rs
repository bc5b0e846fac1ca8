//! The key pair used to sign requests.
//!
//! [`Keys`] holds an access key ID, its secret, and an optional session token.
//! Keys are resolved into memory before a transport is used; the transport
//! never loads them on its own.

use std::fmt;

use crate::error::AuthError;

/// Environment variables consulted for the access key, in priority order.
const ACCESS_KEY_VARS: &[&str] = &["S3_ACCESS_KEY", "AWS_ACCESS_KEY_ID"];
/// Environment variables consulted for the secret key, in priority order.
const SECRET_KEY_VARS: &[&str] = &["S3_SECRET_KEY", "AWS_SECRET_ACCESS_KEY"];
/// Environment variables consulted for the session token, in priority order.
const SECURITY_TOKEN_VARS: &[&str] = &["S3_SECURITY_TOKEN", "AWS_SESSION_TOKEN"];

/// An access key ID and secret, plus an optional session token.
///
/// The secret and token are redacted from the `Debug` output.
///
/// # Examples
///
/// ```
/// use s3sign_auth::Keys;
///
/// let keys = Keys::new("AKID", "hunter2").with_security_token("FQoGZXIvYXdz");
/// assert_eq!(keys.access_key(), "AKID");
/// assert_eq!(keys.security_token(), Some("FQoGZXIvYXdz"));
///
/// let debug = format!("{keys:?}");
/// assert!(!debug.contains("hunter2"));
/// assert!(!debug.contains("FQoGZXIvYXdz"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Keys {
    access_key: String,
    secret_key: String,
    security_token: Option<String>,
}

impl Keys {
    /// Create a key pair without a session token.
    #[must_use]
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            security_token: None,
        }
    }

    /// Attach a session token (sent as `x-amz-security-token`).
    #[must_use]
    pub fn with_security_token(mut self, token: impl Into<String>) -> Self {
        self.security_token = Some(token.into());
        self
    }

    /// The access key ID.
    #[must_use]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// The secret access key.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// The session token, if any.
    #[must_use]
    pub fn security_token(&self) -> Option<&str> {
        self.security_token.as_deref()
    }

    /// Whether either half of the pair is empty. Empty keys cannot sign.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_key.is_empty() || self.secret_key.is_empty()
    }

    /// Load keys from the process environment.
    ///
    /// Reads `S3_ACCESS_KEY` / `S3_SECRET_KEY` (falling back to
    /// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`) and the optional
    /// `S3_SECURITY_TOKEN` (falling back to `AWS_SESSION_TOKEN`).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] naming the first variable that
    /// is unset or empty.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load keys through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let first = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
        };

        let access_key = first(ACCESS_KEY_VARS)
            .ok_or_else(|| AuthError::MissingCredentials(ACCESS_KEY_VARS[0].to_owned()))?;
        let secret_key = first(SECRET_KEY_VARS)
            .ok_or_else(|| AuthError::MissingCredentials(SECRET_KEY_VARS[0].to_owned()))?;

        Ok(Self {
            access_key,
            secret_key,
            security_token: first(SECURITY_TOKEN_VARS),
        })
    }
}

impl fmt::Debug for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys")
            .field("access_key", &self.access_key)
            .field("secret_key", &"** redacted **")
            .field(
                "security_token",
                &self.security_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}
