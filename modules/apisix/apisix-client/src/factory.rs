//! Boundary between the registry and cluster transports.

use std::sync::Arc;

use apisix_sdk::{ApisixError, Cluster, ClusterOptions};

/// Builds a live [`Cluster`] from its options.
///
/// The registry calls the factory once per successful registration, after
/// the name has been checked for uniqueness. Construction errors are passed
/// to the caller unchanged.
pub trait ClusterFactory: Send + Sync {
    /// # Errors
    ///
    /// Any error preventing the cluster from being built.
    fn build(&self, options: &ClusterOptions) -> Result<Arc<dyn Cluster>, ApisixError>;
}

impl<F> ClusterFactory for F
where
    F: Fn(&ClusterOptions) -> Result<Arc<dyn Cluster>, ApisixError> + Send + Sync,
{
    fn build(&self, options: &ClusterOptions) -> Result<Arc<dyn Cluster>, ApisixError> {
        self(options)
    }
}
