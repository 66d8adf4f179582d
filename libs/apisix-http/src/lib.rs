#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! HTTP client for talking to APISIX admin endpoints.
//!
//! A thin hyper-based client with:
//! - TLS via rustls (HTTPS only unless plain HTTP is explicitly allowed)
//! - Connection pooling
//! - Per-request timeouts
//! - Response body size limits
//! - JSON request bodies
//!
//! Retries are deliberately not part of this crate; a failed request is
//! reported to the caller as-is.
//!
//! # Example
//!
//! ```ignore
//! use apisix_http::{HttpClient, TransportSecurity};
//! use std::time::Duration;
//!
//! let client = HttpClient::builder()
//!     .timeout(Duration::from_secs(5))
//!     .transport(TransportSecurity::AllowInsecureHttp)
//!     .build()?;
//!
//! let response = client
//!     .put("http://127.0.0.1:9180/apisix/admin/routes/1")
//!     .json(&serde_json::json!({ "uri": "/hello", "upstream_id": "1" }))?
//!     .send()
//!     .await?;
//! let body = response.bytes().await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod request;
mod response;
mod tls;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{TlsRootConfig, TransportSecurity};
pub use error::{HttpError, InvalidUriKind};
pub use request::RequestBuilder;
pub use response::HttpResponse;
