//! Multi-cluster APISIX client.
//!
//! [`ApisixRegistry`] owns one default cluster plus any number of named
//! clusters added at runtime, and resolves names to [`Cluster`] handles.
//! Clusters are built by a [`ClusterFactory`]; the built-in
//! [`AdminClusterFactory`] talks to the APISIX admin API over HTTP.
//!
//! ```ignore
//! use apisix_client::ApisixRegistry;
//! use apisix_sdk::{ApisixClient, CallContext, ClusterOptions};
//!
//! let registry = ApisixRegistry::new(&ClusterOptions::new(
//!     "default",
//!     "http://127.0.0.1:9180/apisix/admin",
//! ))?;
//! registry.add_cluster(&ClusterOptions::new("prod", "http://10.0.0.7:9180/apisix/admin"))?;
//!
//! let ctx = CallContext::new();
//! let routes = registry.cluster("prod").route().list(&ctx).await?;
//! ```
//!
//! [`Cluster`]: apisix_sdk::Cluster

pub mod admin;
pub mod config;
pub mod factory;
mod non_existent;
pub mod registry;

pub use admin::{AdminCluster, AdminClusterFactory};
pub use config::ApisixClientConfig;
pub use factory::ClusterFactory;
pub use registry::ApisixRegistry;
