//! Name-to-cluster registry with a fixed default cluster.
//!
//! The default cluster is created with the registry and lives for its whole
//! lifetime. Named clusters are added (and optionally removed) at runtime from
//! any thread. Lookups never fail: unknown names resolve to a shared stand-in
//! whose resource operations report [`ApisixError::ClusterNotFound`].

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use apisix_sdk::{ApisixClient, ApisixError, Cluster, ClusterOptions};
use parking_lot::RwLock;

use crate::admin::AdminClusterFactory;
use crate::config::ApisixClientConfig;
use crate::factory::ClusterFactory;
use crate::non_existent::NonExistentCluster;

/// Thread-safe registry of APISIX clusters.
///
/// Built once and shared behind an `Arc`; every method takes `&self`.
pub struct ApisixRegistry {
    default_cluster_name: String,
    default_cluster: Arc<dyn Cluster>,
    non_existent_cluster: Arc<dyn Cluster>,
    clusters: RwLock<HashMap<String, Arc<dyn Cluster>>>,
    factory: Arc<dyn ClusterFactory>,
}

impl ApisixRegistry {
    /// Create a registry whose clusters talk to the APISIX admin API.
    ///
    /// # Errors
    ///
    /// Returns the factory's error if the default cluster cannot be built.
    pub fn new(default_options: &ClusterOptions) -> Result<Self, ApisixError> {
        Self::with_factory(default_options, Arc::new(AdminClusterFactory::new()))
    }

    /// Create a registry that builds every cluster, the default included,
    /// through `factory`.
    ///
    /// # Errors
    ///
    /// Returns the factory's error if the default cluster cannot be built.
    #[tracing::instrument(skip_all, fields(cluster = %default_options.name))]
    pub fn with_factory(
        default_options: &ClusterOptions,
        factory: Arc<dyn ClusterFactory>,
    ) -> Result<Self, ApisixError> {
        let default_cluster = factory.build(default_options)?;
        tracing::info!("default cluster registered");

        Ok(Self {
            default_cluster_name: default_options.name.clone(),
            default_cluster,
            non_existent_cluster: Arc::new(NonExistentCluster::new()),
            clusters: RwLock::new(HashMap::new()),
            factory,
        })
    }

    /// Build a registry from configuration using the admin API factory.
    ///
    /// # Errors
    ///
    /// Fails on the first cluster that cannot be built or whose name is
    /// already taken.
    pub fn from_config(config: &ApisixClientConfig) -> Result<Self, ApisixError> {
        Self::from_config_with_factory(config, Arc::new(AdminClusterFactory::new()))
    }

    /// Build a registry from configuration with a custom factory.
    ///
    /// # Errors
    ///
    /// Fails on the first cluster that cannot be built or whose name is
    /// already taken.
    pub fn from_config_with_factory(
        config: &ApisixClientConfig,
        factory: Arc<dyn ClusterFactory>,
    ) -> Result<Self, ApisixError> {
        let registry = Self::with_factory(&config.default_cluster, factory)?;
        for options in &config.clusters {
            registry.add_cluster(options)?;
        }
        Ok(registry)
    }

    /// Name of the default cluster.
    #[must_use]
    pub fn default_cluster_name(&self) -> &str {
        &self.default_cluster_name
    }

    /// Look up a cluster without falling back to the stand-in.
    #[must_use]
    pub fn try_cluster(&self, name: &str) -> Option<Arc<dyn Cluster>> {
        if name == self.default_cluster_name {
            return Some(self.default_cluster.clone());
        }
        self.clusters.read().get(name).cloned()
    }

    /// Whether `name` resolves to a registered cluster.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        name == self.default_cluster_name || self.clusters.read().contains_key(name)
    }

    /// Number of registered clusters, the default included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.read().len() + 1
    }

    /// Never true while the default cluster exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered names: the default first, then the others in sorted order.
    #[must_use]
    pub fn cluster_names(&self) -> Vec<String> {
        let mut others: Vec<String> = self.clusters.read().keys().cloned().collect();
        others.sort_unstable();

        let mut names = Vec::with_capacity(others.len() + 1);
        names.push(self.default_cluster_name.clone());
        names.extend(others);
        names
    }

    /// Unregister a named cluster and return it.
    ///
    /// Handles already obtained for the cluster keep working; subsequent
    /// lookups of the name resolve to the stand-in.
    ///
    /// # Errors
    ///
    /// - `DefaultClusterRemoval` if `name` is the default cluster
    /// - `UnknownCluster` if `name` is not registered
    #[tracing::instrument(skip(self))]
    pub fn remove_cluster(&self, name: &str) -> Result<Arc<dyn Cluster>, ApisixError> {
        if name == self.default_cluster_name {
            tracing::warn!("refusing to remove the default cluster");
            return Err(ApisixError::DefaultClusterRemoval {
                name: name.to_owned(),
            });
        }

        let removed = self.clusters.write().remove(name);
        match removed {
            Some(cluster) => {
                tracing::info!("cluster removed");
                Ok(cluster)
            }
            None => Err(ApisixError::UnknownCluster {
                name: name.to_owned(),
            }),
        }
    }

    fn duplicated(name: &str) -> ApisixError {
        tracing::warn!("cluster name already registered");
        ApisixError::DuplicatedCluster {
            name: name.to_owned(),
        }
    }
}

impl ApisixClient for ApisixRegistry {
    fn cluster(&self, name: &str) -> Arc<dyn Cluster> {
        self.try_cluster(name).unwrap_or_else(|| {
            tracing::debug!(cluster = name, "cluster not registered");
            self.non_existent_cluster.clone()
        })
    }

    #[tracing::instrument(skip_all, fields(cluster = %options.name))]
    fn add_cluster(&self, options: &ClusterOptions) -> Result<(), ApisixError> {
        let name = options.name.as_str();

        // Cheap rejection before running the factory.
        if self.contains(name) {
            return Err(Self::duplicated(name));
        }

        // The factory may do real work; the map is not locked while it runs.
        let cluster = self.factory.build(options)?;

        // A concurrent add may have claimed the name since the first check.
        match self.clusters.write().entry(name.to_owned()) {
            Entry::Occupied(_) => Err(Self::duplicated(name)),
            Entry::Vacant(slot) => {
                slot.insert(cluster);
                tracing::info!("cluster registered");
                Ok(())
            }
        }
    }

    fn list_clusters(&self) -> Vec<Arc<dyn Cluster>> {
        let clusters = self.clusters.read();
        let mut all = Vec::with_capacity(clusters.len() + 1);
        all.push(self.default_cluster.clone());
        all.extend(clusters.values().cloned());
        all
    }
}

impl fmt::Debug for ApisixRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApisixRegistry")
            .field("default_cluster", &self.default_cluster_name)
            .field("clusters", &self.cluster_names())
            .finish_non_exhaustive()
    }
}
