//! Serializable registry configuration.

use apisix_sdk::ClusterOptions;
use serde::{Deserialize, Serialize};

/// Clusters to register at startup.
///
/// ```yaml
/// default_cluster:
///   name: default
///   base_url: http://127.0.0.1:9180/apisix/admin
/// clusters:
///   - name: prod
///     base_url: https://apisix.prod.internal:9180/apisix/admin
///     timeout: 5s
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApisixClientConfig {
    /// Cluster created together with the registry.
    #[serde(default)]
    pub default_cluster: ClusterOptions,
    /// Additional named clusters, registered in order.
    #[serde(default)]
    pub clusters: Vec<ClusterOptions>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: ApisixClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ApisixClientConfig::default());
        assert_eq!(cfg.default_cluster.name, "default");
        assert!(cfg.clusters.is_empty());
    }

    #[test]
    fn parses_named_clusters() {
        let cfg: ApisixClientConfig = serde_json::from_value(serde_json::json!({
            "default_cluster": { "name": "main", "base_url": "http://a:9180/apisix/admin" },
            "clusters": [
                { "name": "edge", "base_url": "https://b:9180/apisix/admin", "timeout": "3s" }
            ]
        }))
        .unwrap();

        assert_eq!(cfg.default_cluster.name, "main");
        assert_eq!(cfg.clusters.len(), 1);
        assert_eq!(cfg.clusters[0].timeout, Duration::from_secs(3));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res: Result<ApisixClientConfig, _> =
            serde_json::from_value(serde_json::json!({ "clusterz": [] }));
        assert!(res.is_err());
    }
}
