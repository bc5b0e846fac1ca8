//! The round-trip capability and the default network transport.
//!
//! [`Transport`] is the single seam of this crate: the signing transport
//! implements it, wraps another one, and can itself be wrapped by any layer
//! that speaks the same signature. [`ReqwestTransport`] is the host's
//! default network transport, used whenever no delegate is configured.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, LazyLock};

use bytes::Bytes;
use tracing::debug;

use crate::error::TransportError;

/// Boxed future returned by [`Transport::round_trip`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for executing one HTTP request and producing its response.
///
/// The request is borrowed: a transport works on its own copy if it needs to
/// change anything, so the caller's request is never modified.
///
/// # Object Safety
///
/// The future is boxed so transports can be stored as `Arc<dyn Transport>`
/// and swapped at runtime.
pub trait Transport: Send + Sync + 'static {
    /// Send `req` and return the response, or the error that prevented one.
    fn round_trip<'a>(
        &'a self,
        req: &'a http::Request<Bytes>,
    ) -> BoxFuture<'a, Result<http::Response<Bytes>, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn round_trip<'a>(
        &'a self,
        req: &'a http::Request<Bytes>,
    ) -> BoxFuture<'a, Result<http::Response<Bytes>, TransportError>> {
        (**self).round_trip(req)
    }
}

static SHARED_REQWEST: LazyLock<Arc<ReqwestTransport>> =
    LazyLock::new(|| Arc::new(ReqwestTransport::default()));

/// Network transport backed by a [`reqwest::Client`].
///
/// Connection pooling, DNS, and TLS are left entirely to the client. The
/// response body is buffered into [`Bytes`] and otherwise passed through
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// The process-wide default network transport.
    #[must_use]
    pub fn shared() -> Arc<ReqwestTransport> {
        Arc::clone(&SHARED_REQWEST)
    }

    async fn execute(
        &self,
        req: &http::Request<Bytes>,
    ) -> Result<http::Response<Bytes>, TransportError> {
        let request = reqwest::Request::try_from(clone_request(req))?;
        debug!(method = %request.method(), url = %request.url(), "sending request");

        let response = self.client.execute(request).await?;

        let mut builder = http::Response::builder()
            .status(response.status())
            .version(response.version());
        if let Some(headers) = builder.headers_mut() {
            *headers = response.headers().clone();
        }
        let body = response.bytes().await?;

        builder
            .body(body)
            .map_err(|err| TransportError::Http(Box::new(err)))
    }
}

impl Transport for ReqwestTransport {
    fn round_trip<'a>(
        &'a self,
        req: &'a http::Request<Bytes>,
    ) -> BoxFuture<'a, Result<http::Response<Bytes>, TransportError>> {
        Box::pin(self.execute(req))
    }
}

/// Copy a borrowed request into an owned one.
///
/// `Bytes` clones share the immutable body buffer; headers and extensions are
/// copied.
pub(crate) fn clone_request(req: &http::Request<Bytes>) -> http::Request<Bytes> {
    let mut out = http::Request::new(req.body().clone());
    *out.method_mut() = req.method().clone();
    *out.uri_mut() = req.uri().clone();
    *out.version_mut() = req.version();
    *out.headers_mut() = req.headers().clone();
    *out.extensions_mut() = req.extensions().clone();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_share_one_reqwest_transport() {
        assert!(Arc::ptr_eq(
            &ReqwestTransport::shared(),
            &ReqwestTransport::shared()
        ));
    }

    #[test]
    fn test_should_clone_request_independently() {
        let original = http::Request::builder()
            .method(http::Method::PUT)
            .uri("https://bucket.s3.amazonaws.com/key")
            .header("x-amz-meta-a", "1")
            .body(Bytes::from_static(b"payload"))
            .unwrap();

        let mut copy = clone_request(&original);
        copy.headers_mut().insert("x-amz-meta-a", "2".parse().unwrap());

        assert_eq!(copy.method(), http::Method::PUT);
        assert_eq!(copy.uri(), original.uri());
        assert_eq!(copy.body(), original.body());
        assert_eq!(original.headers()["x-amz-meta-a"], "1");
    }

    #[tokio::test]
    async fn test_should_surface_unsupported_scheme_as_http_error() {
        let transport = ReqwestTransport::default();
        let req = http::Request::builder()
            .uri("s3://bucket/key")
            .body(Bytes::new())
            .unwrap();

        let err = transport.round_trip(&req).await.unwrap_err();
        assert!(matches!(err, TransportError::Http(_)));
    }
}
