//! Stand-in cluster returned for names that are not registered.

use std::sync::Arc;

use apisix_sdk::{
    ApisixError, CallContext, Cluster, Resource, ResourceClient, RouteClient, ServiceClient,
    SslClient, UpstreamClient,
};
use async_trait::async_trait;

/// Every resource operation fails with [`ApisixError::ClusterNotFound`]
/// without touching any transport.
pub(crate) struct NonExistentCluster {
    resource: Arc<NonExistentResource>,
}

impl NonExistentCluster {
    pub(crate) fn new() -> Self {
        Self {
            resource: Arc::new(NonExistentResource),
        }
    }
}

impl Cluster for NonExistentCluster {
    fn name(&self) -> &str {
        ""
    }

    fn route(&self) -> Arc<RouteClient> {
        self.resource.clone()
    }

    fn upstream(&self) -> Arc<UpstreamClient> {
        self.resource.clone()
    }

    fn service(&self) -> Arc<ServiceClient> {
        self.resource.clone()
    }

    fn ssl(&self) -> Arc<SslClient> {
        self.resource.clone()
    }
}

struct NonExistentResource;

impl NonExistentResource {
    fn not_found<T: Resource>(op: &'static str) -> ApisixError {
        tracing::debug!(kind = %T::KIND, op, "resource operation on a non-existent cluster");
        ApisixError::ClusterNotFound
    }
}

#[async_trait]
impl<T: Resource> ResourceClient<T> for NonExistentResource {
    async fn list(&self, _ctx: &CallContext) -> Result<Vec<T>, ApisixError> {
        Err(Self::not_found::<T>("list"))
    }

    async fn create(&self, _ctx: &CallContext, _resource: &T) -> Result<T, ApisixError> {
        Err(Self::not_found::<T>("create"))
    }

    async fn update(&self, _ctx: &CallContext, _resource: &T) -> Result<T, ApisixError> {
        Err(Self::not_found::<T>("update"))
    }

    async fn delete(&self, _ctx: &CallContext, _resource: &T) -> Result<(), ApisixError> {
        Err(Self::not_found::<T>("delete"))
    }
}
