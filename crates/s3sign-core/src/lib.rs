//! Shared configuration for s3sign.
//!
//! The signing transport itself is configured programmatically; this crate
//! holds the environment-driven settings that applications read at startup
//! before wiring the transport together.

pub mod config;

pub use config::{DEFAULT_DOMAIN, SignConfig};
