//! The signing strategy seam.
//!
//! A [`Sign`] implementation receives the transport's private copy of a
//! request and adds whatever authentication material the storage service
//! expects. When a transport has no signer configured it falls back to
//! [`default_signer`].

use std::sync::{Arc, LazyLock};

use bytes::Bytes;

use crate::error::AuthError;
use crate::keys::Keys;
use crate::sigv2::SigV2Signer;

/// Trait for adding authentication material to an outbound request.
///
/// Implementations mutate the request in place. They must be safe to call
/// concurrently, since one signer is typically shared by every request a
/// transport sends.
pub trait Sign: Send + Sync + 'static {
    /// Sign `req` with `keys`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the keys or request cannot be signed.
    fn sign(&self, req: &mut http::Request<Bytes>, keys: &Keys) -> Result<(), AuthError>;
}

impl<S: Sign + ?Sized> Sign for Arc<S> {
    fn sign(&self, req: &mut http::Request<Bytes>, keys: &Keys) -> Result<(), AuthError> {
        (**self).sign(req, keys)
    }
}

static DEFAULT_SIGNER: LazyLock<Arc<dyn Sign>> =
    LazyLock::new(|| Arc::new(SigV2Signer::default()));

/// The process-wide default signer: a [`SigV2Signer`] for `s3.amazonaws.com`.
#[must_use]
pub fn default_signer() -> Arc<dyn Sign> {
    Arc::clone(&DEFAULT_SIGNER)
}
