//! Error types for request signing.

/// Errors raised while loading keys or signing a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A required credential environment variable is not set.
    #[error("missing credentials: {0} is not set")]
    MissingCredentials(String),

    /// The key pair cannot be used to compute a signature.
    #[error("invalid signing key")]
    InvalidKey,

    /// A header produced by the signer is not a valid HTTP header value.
    #[error("invalid header value for {0}")]
    InvalidHeaderValue(String),
}
