//! Public API traits for APISIX clusters and their resources.
//!
//! Every implementation - the admin-API transport, the stand-in returned
//! for unknown cluster names, test fakes - satisfies the same traits, so
//! callers never branch on which one they hold.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::ApisixError;
use crate::models::{Resource, Route, Service, Ssl, Upstream};
use crate::options::ClusterOptions;

/// CRUD over one resource kind of one cluster.
///
/// Handlers are stateless dispatchers; they may be called concurrently and
/// impose no ordering between calls.
///
/// # Cancellation
///
/// Each operation observes `ctx`: when the context is cancelled or its
/// deadline passes before or during the call, the operation fails with
/// [`ApisixError::Cancelled`] or [`ApisixError::DeadlineExceeded`].
#[async_trait]
pub trait ResourceClient<T: Resource>: Send + Sync {
    /// List every resource of this kind known to the cluster.
    ///
    /// Ordering is whatever the cluster returns.
    ///
    /// # Errors
    ///
    /// Transport, decoding, or cancellation errors.
    async fn list(&self, ctx: &CallContext) -> Result<Vec<T>, ApisixError>;

    /// Create a resource and return the stored representation, which may
    /// include server-assigned fields (id, timestamps).
    ///
    /// # Errors
    ///
    /// Transport, rejection, or cancellation errors.
    async fn create(&self, ctx: &CallContext, resource: &T) -> Result<T, ApisixError>;

    /// Replace an existing resource, identified by its id.
    ///
    /// # Errors
    ///
    /// - `MissingResourceId` if `resource` has no id
    /// - `ResourceNotFound` if the cluster does not know the id
    async fn update(&self, ctx: &CallContext, resource: &T) -> Result<T, ApisixError>;

    /// Delete an existing resource, identified by its id.
    ///
    /// # Errors
    ///
    /// - `MissingResourceId` if `resource` has no id
    /// - `ResourceNotFound` if the cluster does not know the id
    async fn delete(&self, ctx: &CallContext, resource: &T) -> Result<(), ApisixError>;
}

/// Route handler of a cluster.
pub type RouteClient = dyn ResourceClient<Route>;
/// Upstream handler of a cluster.
pub type UpstreamClient = dyn ResourceClient<Upstream>;
/// Service handler of a cluster.
pub type ServiceClient = dyn ResourceClient<Service>;
/// SSL handler of a cluster.
pub type SslClient = dyn ResourceClient<Ssl>;

/// One APISIX cluster's full resource surface.
///
/// Accessors are idempotent: repeated calls return handlers that behave
/// identically, and never an absent handler.
pub trait Cluster: Send + Sync {
    /// Name the cluster was registered under.
    fn name(&self) -> &str;

    /// Route handler bound to this cluster.
    fn route(&self) -> Arc<RouteClient>;

    /// Upstream handler bound to this cluster.
    fn upstream(&self) -> Arc<UpstreamClient>;

    /// Service handler bound to this cluster.
    fn service(&self) -> Arc<ServiceClient>;

    /// SSL handler bound to this cluster.
    fn ssl(&self) -> Arc<SslClient>;
}

/// Multi-cluster registry contract.
///
/// ```ignore
/// client.add_cluster(&ClusterOptions::new("prod", "http://10.0.0.7:9180/apisix/admin"))?;
///
/// for cluster in client.list_clusters() {
///     let upstreams = cluster.upstream().list(&ctx).await?;
/// }
/// ```
pub trait ApisixClient: Send + Sync {
    /// Resolve a cluster by name.
    ///
    /// Never fails: an unknown name yields a cluster whose every resource
    /// operation fails with [`ApisixError::ClusterNotFound`].
    fn cluster(&self, name: &str) -> Arc<dyn Cluster>;

    /// Register an additional cluster.
    ///
    /// # Errors
    ///
    /// - `DuplicatedCluster` if the name is the default cluster's or is
    ///   already registered
    /// - any error raised while constructing the cluster
    fn add_cluster(&self, options: &ClusterOptions) -> Result<(), ApisixError>;

    /// All registered clusters, default first.
    fn list_clusters(&self) -> Vec<Arc<dyn Cluster>>;
}
