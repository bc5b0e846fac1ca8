//! s3sign-fetch - send one signed request to an `s3://` URL.
//!
//! Loads keys from the environment, registers the signing transport under the
//! `s3` scheme, sends the request, writes the status line to stderr and the
//! body to stdout.
//!
//! # Usage
//!
//! ```text
//! S3_ACCESS_KEY=... S3_SECRET_KEY=... s3sign-fetch [-X METHOD] [-H 'Name: value']... s3://bucket.s3.amazonaws.com/key
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `S3_ACCESS_KEY` / `AWS_ACCESS_KEY_ID` | *(required)* | Access key ID |
//! | `S3_SECRET_KEY` / `AWS_SECRET_ACCESS_KEY` | *(required)* | Secret access key |
//! | `S3_SECURITY_TOKEN` / `AWS_SESSION_TOKEN` | *(unset)* | Session token |
//! | `S3_DOMAIN` | `s3.amazonaws.com` | Domain for virtual-hosted bucket detection |
//! | `S3_REGISTER_DEFAULT` | `true` | Route through the global `s3` registration |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use clap::Parser;
use s3sign_auth::{Keys, SigV2Signer, Sign};
use s3sign_core::SignConfig;
use s3sign_transport::{
    SigningTransport, Transport, TransportRegistry, configure_default, register_default,
};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Send one signed request to an `s3://` URL.
#[derive(Debug, PartialEq, Eq, Parser)]
#[command(version, about)]
struct FetchArgs {
    /// HTTP method to use.
    #[arg(short = 'X', long = "request", default_value = "GET", value_parser = parse_method)]
    method: http::Method,
    /// Extra request header, as 'Name: value'. May be repeated.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,
    /// Target URL, usually `s3://bucket.s3.amazonaws.com/key`.
    url: String,
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
/// Logs go to stderr so stdout carries only the response body.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Parse a method name case-insensitively.
fn parse_method(value: &str) -> Result<http::Method> {
    value
        .to_ascii_uppercase()
        .parse()
        .with_context(|| format!("invalid method: {value}"))
}

/// Parse a `Name: value` header argument.
fn parse_header(value: &str) -> Result<(String, String)> {
    let (name, val) = value
        .split_once(':')
        .with_context(|| format!("header must be 'Name: value': {value}"))?;
    Ok((name.trim().to_owned(), val.trim().to_owned()))
}

/// Build the request described by the command line.
fn build_request(args: &FetchArgs) -> Result<http::Request<Bytes>> {
    let mut builder = http::Request::builder()
        .method(args.method.clone())
        .uri(args.url.as_str());
    for (name, value) in &args.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
        .body(Bytes::new())
        .with_context(|| format!("invalid request for {}", args.url))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = FetchArgs::parse();
    let config = SignConfig::from_env();

    init_tracing(&config.log_level)?;

    let keys = Keys::from_env().context("cannot load S3 keys")?;
    info!(
        access_key = %keys.access_key(),
        s3_domain = %config.s3_domain,
        register_default = config.register_default,
        "configured signing transport",
    );

    let signer: Arc<dyn Sign> = Arc::new(SigV2Signer::new(config.s3_domain.clone()));
    configure_default(|t| {
        t.set_keys(Some(keys));
        t.set_signer(Some(signer));
    });

    let req = build_request(&args)?;
    let result = if config.register_default {
        let registry = TransportRegistry::global();
        register_default(registry);
        registry.round_trip(&req).await
    } else {
        SigningTransport::shared_default().dispatch(&req).await
    };
    let response = result.with_context(|| format!("{} {} failed", args.method, args.url))?;

    debug!(headers = ?response.headers(), "received response");
    eprintln!("{:?} {}", response.version(), response.status());

    let mut stdout = tokio::io::stdout();
    stdout.write_all(response.body()).await?;
    stdout.flush().await?;

    if !response.status().is_success() {
        bail!("request returned {}", response.status());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(list: &[&str]) -> Result<FetchArgs, clap::Error> {
        FetchArgs::try_parse_from(std::iter::once("s3sign-fetch").chain(list.iter().copied()))
    }

    #[test]
    fn test_should_parse_url_only() {
        let parsed = parse(&["s3://bucket/key"]).unwrap();
        assert_eq!(parsed.method, http::Method::GET);
        assert!(parsed.headers.is_empty());
        assert_eq!(parsed.url, "s3://bucket/key");
    }

    #[test]
    fn test_should_parse_method_and_headers() {
        let parsed = parse(&[
            "-X",
            "head",
            "-H",
            "x-amz-meta-a: 1",
            "--header",
            "Range:bytes=0-9",
            "s3://bucket/key",
        ])
        .unwrap();

        assert_eq!(parsed.method, http::Method::HEAD);
        assert_eq!(
            parsed.headers,
            vec![
                ("x-amz-meta-a".to_owned(), "1".to_owned()),
                ("Range".to_owned(), "bytes=0-9".to_owned()),
            ]
        );
    }

    #[test]
    fn test_should_accept_long_request_flag() {
        let parsed = parse(&["--request", "PUT", "s3://bucket/key"]).unwrap();
        assert_eq!(parsed.method, http::Method::PUT);
    }

    #[test]
    fn test_should_reject_bad_arguments() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["-X"]).is_err());
        assert!(parse(&["-H", "no-colon", "s3://b/k"]).is_err());
        assert!(parse(&["s3://b/k", "s3://b/other"]).is_err());
        assert!(parse(&["--verbose", "s3://b/k"]).is_err());
    }

    #[test]
    fn test_should_build_request_from_args() {
        let parsed = parse(&["-H", "x-amz-acl: private", "s3://bucket/key"]).unwrap();
        let req = build_request(&parsed).unwrap();
        assert_eq!(req.uri(), "s3://bucket/key");
        assert_eq!(req.headers()["x-amz-acl"], "private");
    }
}
