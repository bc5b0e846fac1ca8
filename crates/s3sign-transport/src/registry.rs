//! Scheme-based transport registry and the process-wide default instance.
//!
//! A [`TransportRegistry`] routes each request by URL scheme: registered
//! schemes go to their transport, everything else to a fallback. The global
//! registry ([`TransportRegistry::global`]) plays the role of the host's
//! default transport, and [`register_default`] is the explicit startup step
//! that makes `s3://` URLs go through the shared [`SigningTransport`].

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::TransportError;
use crate::interceptor::{STORAGE_SCHEME, SigningTransport};
use crate::transport::{BoxFuture, ReqwestTransport, Transport};

static GLOBAL_REGISTRY: LazyLock<TransportRegistry> =
    LazyLock::new(|| TransportRegistry::new(ReqwestTransport::shared()));

static SHARED_DEFAULT: LazyLock<RwLock<Arc<SigningTransport>>> =
    LazyLock::new(|| RwLock::new(Arc::new(SigningTransport::new())));

/// Routes requests to transports by URL scheme.
///
/// Each scheme can be registered once; the first registration wins.
pub struct TransportRegistry {
    protocols: RwLock<HashMap<String, Arc<dyn Transport>>>,
    fallback: Arc<dyn Transport>,
}

impl std::fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut schemes: Vec<String> = self.protocols.read().keys().cloned().collect();
        schemes.sort();
        f.debug_struct("TransportRegistry")
            .field("schemes", &schemes)
            .finish_non_exhaustive()
    }
}

impl TransportRegistry {
    /// Create an empty registry sending unregistered schemes to `fallback`.
    #[must_use]
    pub fn new(fallback: Arc<dyn Transport>) -> Self {
        Self {
            protocols: RwLock::new(HashMap::new()),
            fallback,
        }
    }

    /// The process-wide registry, falling back to [`ReqwestTransport::shared`].
    #[must_use]
    pub fn global() -> &'static TransportRegistry {
        &GLOBAL_REGISTRY
    }

    /// Route requests for `scheme` to `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::SchemeAlreadyRegistered`] if `scheme` already
    /// has a transport; the existing registration is kept.
    pub fn register_protocol(
        &self,
        scheme: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<(), TransportError> {
        let scheme = scheme.to_ascii_lowercase();
        let mut protocols = self.protocols.write();
        if protocols.contains_key(&scheme) {
            return Err(TransportError::SchemeAlreadyRegistered(scheme));
        }
        debug!(%scheme, "registered transport");
        protocols.insert(scheme, transport);
        Ok(())
    }

    /// Whether `scheme` has a registered transport.
    #[must_use]
    pub fn is_registered(&self, scheme: &str) -> bool {
        self.protocols
            .read()
            .contains_key(&scheme.to_ascii_lowercase())
    }

    /// The transport registered for `scheme`, if any.
    #[must_use]
    pub fn transport_for(&self, scheme: &str) -> Option<Arc<dyn Transport>> {
        self.protocols
            .read()
            .get(&scheme.to_ascii_lowercase())
            .cloned()
    }
}

impl Transport for TransportRegistry {
    fn round_trip<'a>(
        &'a self,
        req: &'a http::Request<Bytes>,
    ) -> BoxFuture<'a, Result<http::Response<Bytes>, TransportError>> {
        let transport = req
            .uri()
            .scheme_str()
            .and_then(|scheme| self.transport_for(scheme))
            .unwrap_or_else(|| Arc::clone(&self.fallback));

        Box::pin(async move { transport.round_trip(req).await })
    }
}

impl SigningTransport {
    /// The current shared default instance.
    ///
    /// It starts without keys; configure it with [`configure_default`].
    #[must_use]
    pub fn shared_default() -> Arc<SigningTransport> {
        Arc::clone(&SHARED_DEFAULT.read())
    }
}

/// Reconfigure the shared default instance.
///
/// Requests already in flight keep the configuration they started with;
/// later requests through the registered handle see the new one. The write
/// lock is held while `configure` runs, so it must not call
/// [`SigningTransport::shared_default`].
///
/// # Examples
///
/// ```
/// use s3sign_auth::Keys;
/// use s3sign_transport::{SigningTransport, configure_default};
///
/// configure_default(|t| t.set_keys(Some(Keys::new("AKID", "secret"))));
/// assert!(SigningTransport::shared_default().keys().is_some());
/// ```
pub fn configure_default(configure: impl FnOnce(&mut SigningTransport)) {
    let mut current = SHARED_DEFAULT.write();
    let mut next = SigningTransport::clone(&current);
    configure(&mut next);
    *current = Arc::new(next);
}

/// Forwards to whatever [`SigningTransport::shared_default`] is at call time.
#[derive(Debug, Clone, Copy, Default)]
struct SharedDefaultHandle;

impl Transport for SharedDefaultHandle {
    fn round_trip<'a>(
        &'a self,
        req: &'a http::Request<Bytes>,
    ) -> BoxFuture<'a, Result<http::Response<Bytes>, TransportError>> {
        let transport = SigningTransport::shared_default();
        Box::pin(async move { transport.dispatch(req).await })
    }
}

/// Register the shared default signing transport under the `s3` scheme.
///
/// Returns `true` if this call made the registration and `false` if `s3` was
/// already taken, in which case nothing changes.
pub fn register_default(registry: &TransportRegistry) -> bool {
    match registry.register_protocol(STORAGE_SCHEME, Arc::new(SharedDefaultHandle)) {
        Ok(()) => true,
        Err(err) => {
            debug!(error = %err, "skipping default registration");
            false
        }
    }
}
