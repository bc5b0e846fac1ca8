//! Error types for the signing transport.

use s3sign_auth::AuthError;

/// Boxed error produced by a delegate transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by [`Transport::round_trip`](crate::Transport::round_trip).
///
/// Only [`TransportError::UninitializedKeys`] and
/// [`TransportError::InvalidRequest`] originate in the signing transport; the
/// other variants carry a collaborator's error unchanged as their source.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport was asked to sign a request before keys were configured.
    #[error("s3: uninitialized keys")]
    UninitializedKeys,

    /// The signer rejected the request or the keys.
    #[error("s3: signing failed")]
    Signing(#[source] AuthError),

    /// The request cannot be rewritten for transmission.
    #[error("s3: invalid request: {0}")]
    InvalidRequest(String),

    /// A transport is already registered for this URL scheme.
    #[error("scheme already registered: {0}")]
    SchemeAlreadyRegistered(String),

    /// The delegate transport failed (DNS, TLS, connection, timeout, I/O).
    #[error(transparent)]
    Http(BoxError),
}

impl From<AuthError> for TransportError {
    fn from(err: AuthError) -> Self {
        Self::Signing(err)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(Box::new(err))
    }
}
