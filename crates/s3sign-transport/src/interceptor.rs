//! The signing transport.
//!
//! [`SigningTransport`] accepts requests addressed with the `s3://` scheme
//! (or any other scheme) and sends a signed `https://` copy through its
//! delegate:
//!
//! ```text
//! caller request (borrowed, never modified)
//!   -> keys present?                       else UninitializedKeys
//!   -> prepare_request                     fresh URI, fresh HeaderMap
//!     -> scheme := https
//!     -> Date := now (UTC) if absent or empty
//!   -> signer.sign(copy, keys)             configured or default_signer()
//!   -> delegate.round_trip(copy)           configured or ReqwestTransport::shared()
//!   <- response / error, unchanged
//! ```

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::DATE;
use http::uri::{PathAndQuery, Scheme};
use http::{HeaderMap, HeaderValue, Uri};
use s3sign_auth::{Keys, Sign, default_signer};
use tracing::debug;

use crate::error::TransportError;
use crate::transport::{BoxFuture, ReqwestTransport, Transport};

/// The URL scheme that routes a request through the signing transport.
pub const STORAGE_SCHEME: &str = "s3";

/// The scheme every signed request is sent with.
pub const SECURE_SCHEME: &str = "https";

/// Format of the `Date` header (RFC 7231 IMF-fixdate).
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Transport that signs a copy of each request before handing it on.
///
/// All three dependencies are optional at construction time. Keys must be
/// set before the first request; the signer and delegate fall back to the
/// process-wide defaults, resolved on every call so that reconfiguration
/// through the setters takes effect on the next request.
///
/// # Examples
///
/// ```
/// use s3sign_auth::Keys;
/// use s3sign_transport::SigningTransport;
///
/// let transport = SigningTransport::new().with_keys(Keys::new("AKID", "secret"));
/// assert!(transport.keys().is_some());
/// ```
#[derive(Clone)]
pub struct SigningTransport {
    keys: Option<Keys>,
    signer: Option<Arc<dyn Sign>>,
    delegate: Option<Arc<dyn Transport>>,
    clock: fn() -> DateTime<Utc>,
}

impl Default for SigningTransport {
    fn default() -> Self {
        Self {
            keys: None,
            signer: None,
            delegate: None,
            clock: Utc::now,
        }
    }
}

impl fmt::Debug for SigningTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningTransport")
            .field("keys", &self.keys)
            .field("signer", &self.signer.as_ref().map(|_| "..."))
            .field("delegate", &self.delegate.as_ref().map(|_| "..."))
            .finish_non_exhaustive()
    }
}

impl SigningTransport {
    /// Create a transport with no keys, default signer, and default delegate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the keys requests are signed with.
    #[must_use]
    pub fn with_keys(mut self, keys: Keys) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Use `signer` instead of the process-wide default signer.
    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn Sign>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Send signed requests through `delegate` instead of the default network transport.
    #[must_use]
    pub fn with_delegate(mut self, delegate: Arc<dyn Transport>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Use `clock` to stamp the `Date` header of requests that lack one.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace (or clear) the keys.
    pub fn set_keys(&mut self, keys: Option<Keys>) {
        self.keys = keys;
    }

    /// Replace (or clear, falling back to the default) the signer.
    pub fn set_signer(&mut self, signer: Option<Arc<dyn Sign>>) {
        self.signer = signer;
    }

    /// Replace (or clear, falling back to the default) the delegate.
    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn Transport>>) {
        self.delegate = delegate;
    }

    /// The configured keys, if any.
    #[must_use]
    pub fn keys(&self) -> Option<&Keys> {
        self.keys.as_ref()
    }

    /// Sign a copy of `req` and send it through the delegate.
    ///
    /// # Errors
    ///
    /// - [`TransportError::UninitializedKeys`] if no (or empty) keys are
    ///   configured; neither the signer nor the delegate is called.
    /// - [`TransportError::InvalidRequest`] if the URI has no authority to
    ///   send to.
    /// - [`TransportError::Signing`] with the signer's error.
    /// - Whatever the delegate returns, unchanged.
    pub async fn dispatch(
        &self,
        req: &http::Request<Bytes>,
    ) -> Result<http::Response<Bytes>, TransportError> {
        let keys = self
            .keys
            .as_ref()
            .filter(|keys| !keys.is_empty())
            .ok_or(TransportError::UninitializedKeys)?;

        let mut prepared = prepare_request(req, (self.clock)())?;

        let signer = self.signer.clone().unwrap_or_else(default_signer);
        signer.sign(&mut prepared, keys)?;

        let delegate: Arc<dyn Transport> = match &self.delegate {
            Some(delegate) => Arc::clone(delegate),
            None => ReqwestTransport::shared(),
        };

        debug!(method = %prepared.method(), uri = %prepared.uri(), "dispatching signed request");
        delegate.round_trip(&prepared).await
    }
}

impl Transport for SigningTransport {
    fn round_trip<'a>(
        &'a self,
        req: &'a http::Request<Bytes>,
    ) -> BoxFuture<'a, Result<http::Response<Bytes>, TransportError>> {
        Box::pin(self.dispatch(req))
    }
}

/// Build the owned copy of `req` that will be signed and sent.
///
/// The copy gets a newly constructed `https` URI and a fresh header map
/// filled entry by entry, so nothing the signer does can reach the
/// original. `Date` is set to `now` only when missing or empty.
pub fn prepare_request(
    req: &http::Request<Bytes>,
    now: DateTime<Utc>,
) -> Result<http::Request<Bytes>, TransportError> {
    let mut prepared = http::Request::new(req.body().clone());
    *prepared.method_mut() = req.method().clone();
    *prepared.version_mut() = req.version();
    *prepared.uri_mut() = secure_uri(req.uri())?;
    *prepared.extensions_mut() = req.extensions().clone();

    let headers = prepared.headers_mut();
    copy_headers(headers, req.headers());
    if headers.get(DATE).is_none_or(|v| v.as_bytes().is_empty()) {
        let date = now.format(HTTP_DATE_FORMAT).to_string();
        let value = HeaderValue::from_str(&date)
            .map_err(|_| TransportError::InvalidRequest(format!("unrepresentable date {date}")))?;
        headers.insert(DATE, value);
    }

    Ok(prepared)
}

/// Rebuild `uri` with the `https` scheme, keeping authority, path, and query.
fn secure_uri(uri: &Uri) -> Result<Uri, TransportError> {
    let mut parts = uri.clone().into_parts();
    if parts.authority.is_none() {
        return Err(TransportError::InvalidRequest(format!(
            "{uri}: missing host"
        )));
    }

    let scheme = Scheme::try_from(SECURE_SCHEME)
        .map_err(|err| TransportError::InvalidRequest(format!("{SECURE_SCHEME}: {err}")))?;
    parts.scheme = Some(scheme);
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }

    Uri::from_parts(parts).map_err(|err| TransportError::InvalidRequest(format!("{uri}: {err}")))
}

/// Append every value of every header in `src` to `dst`, in order.
fn copy_headers(dst: &mut HeaderMap, src: &HeaderMap) {
    for (name, value) in src {
        dst.append(name.clone(), value.clone());
    }
}
