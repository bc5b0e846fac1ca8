//! Signing HTTP transport for S3-style storage services.
//!
//! This crate turns plain requests addressed to `s3://bucket/key` into signed
//! `https://bucket/key` requests. The pieces:
//!
//! - **Transport** ([`transport`]): the [`Transport`] round-trip trait and the
//!   default network transport, [`ReqwestTransport`].
//!
//! - **Signing transport** ([`interceptor`]): [`SigningTransport`] copies each
//!   request, forces `https`, stamps a `Date` header when missing, signs the
//!   copy with a [`Sign`](s3sign_auth::Sign) strategy, and hands it to its
//!   delegate.
//!
//! - **Registry** ([`registry`]): [`TransportRegistry`] routes by URL scheme;
//!   [`register_default`] wires the shared signing transport under `s3`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use s3sign_auth::Keys;
//! use s3sign_transport::{Transport, TransportRegistry, configure_default, register_default};
//!
//! # async fn run() -> Result<(), s3sign_transport::TransportError> {
//! configure_default(|t| t.set_keys(Some(Keys::new("AKID", "secret"))));
//! register_default(TransportRegistry::global());
//!
//! let req = http::Request::builder()
//!     .uri("s3://my-bucket.s3.amazonaws.com/photos/puppy.jpg")
//!     .body(Bytes::new())
//!     .expect("valid request");
//! let response = TransportRegistry::global().round_trip(&req).await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod interceptor;
pub mod registry;
pub mod transport;

pub use error::{BoxError, TransportError};
pub use interceptor::{SECURE_SCHEME, STORAGE_SCHEME, SigningTransport, prepare_request};
pub use registry::{TransportRegistry, configure_default, register_default};
pub use transport::{BoxFuture, ReqwestTransport, Transport};
