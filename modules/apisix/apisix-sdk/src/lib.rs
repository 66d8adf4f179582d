//! APISIX client SDK
//!
//! This crate provides the public contracts for managing several APISIX
//! control planes ("clusters") from one process:
//!
//! - [`ApisixClient`] - the multi-cluster registry contract
//! - [`Cluster`] - one cluster's full resource surface
//! - [`ResourceClient`] - List/Create/Update/Delete over one resource kind
//! - [`Route`], [`Upstream`], [`Service`], [`Ssl`] - resource models
//! - [`CallContext`] - cancellation and deadline carried by every call
//! - [`ApisixError`] - error types
//!
//! ## Usage
//!
//! ```ignore
//! use apisix_sdk::{ApisixClient, CallContext};
//! use std::time::Duration;
//!
//! let ctx = CallContext::new().with_timeout(Duration::from_secs(5));
//!
//! // Unknown names resolve to a cluster whose operations fail with
//! // `ApisixError::ClusterNotFound`, so no separate lookup check is needed.
//! let routes = client.cluster("prod").route().list(&ctx).await?;
//! ```

pub mod api;
pub mod context;
pub mod error;
pub mod models;
pub mod options;

pub use api::{
    ApisixClient, Cluster, ResourceClient, RouteClient, ServiceClient, SslClient, UpstreamClient,
};
pub use context::CallContext;
pub use error::ApisixError;
pub use models::{
    Extra, LoadBalancer, ParseResourceKindError, Plugins, Resource, ResourceKind, Route, Service,
    Ssl, Upstream, UpstreamNode, UpstreamTimeout,
};
pub use options::ClusterOptions;
