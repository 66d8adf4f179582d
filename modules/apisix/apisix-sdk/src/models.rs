//! Resource models understood by the APISIX admin API.
//!
//! The registry and the handlers pass these through untouched; only the id
//! is inspected, to address update and delete calls. Each model keeps the
//! fields it does not name in `extra`, so a listed resource sent back through
//! `update` reaches the admin API with its whole configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::api::{Cluster, ResourceClient};

/// Plugin name to plugin configuration.
pub type Plugins = BTreeMap<String, Value>;

/// Admin API fields a model does not name (`uri`, `host`, `vars`, `labels`,
/// inline `upstream`, ...), kept verbatim.
pub type Extra = Map<String, Value>;

/// The four resource kinds managed per cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Route,
    Upstream,
    Service,
    Ssl,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [Self::Route, Self::Upstream, Self::Service, Self::Ssl];

    /// Singular lowercase name (`route`, `upstream`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::Upstream => "upstream",
            Self::Service => "service",
            Self::Ssl => "ssl",
        }
    }

    /// Admin API collection segment (`routes`, `upstreams`, ...).
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            Self::Route => "routes",
            Self::Upstream => "upstreams",
            Self::Service => "services",
            Self::Ssl => "ssls",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown resource kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource kind '{0}' (expected route, upstream, service or ssl)")]
pub struct ParseResourceKindError(String);

impl FromStr for ResourceKind {
    type Err = ParseResourceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| lower == k.as_str() || lower == k.collection())
            .ok_or(ParseResourceKindError(lower))
    }
}

/// A resource managed through a [`ResourceClient`].
pub trait Resource:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    const KIND: ResourceKind;

    /// Resource id, `None` until assigned.
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    /// The handler for this kind on `cluster`.
    fn handler(cluster: &dyn Cluster) -> Arc<dyn ResourceClient<Self>>;
}

macro_rules! impl_resource {
    ($ty:ty, $kind:expr, $accessor:ident) => {
        impl Resource for $ty {
            const KIND: ResourceKind = $kind;

            fn id(&self) -> Option<&str> {
                Some(self.id.as_str()).filter(|id| !id.is_empty())
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn handler(cluster: &dyn Cluster) -> Arc<dyn ResourceClient<Self>> {
                cluster.$accessor()
            }
        }
    };
}

/// Request matching rule bound to an upstream or service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub plugins: Plugins,
    #[serde(default, skip_serializing)]
    pub create_time: Option<i64>,
    #[serde(default, skip_serializing)]
    pub update_time: Option<i64>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_resource!(Route, ResourceKind::Route, route);

/// Load balancing algorithm of an upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadBalancer {
    #[serde(rename = "roundrobin")]
    RoundRobin,
    #[serde(rename = "chash")]
    ConsistentHash,
    #[serde(rename = "ewma")]
    Ewma,
    #[serde(rename = "least_conn")]
    LeastConnections,
}

/// Backend address of an upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamNode {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

/// Upstream timeouts, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamTimeout {
    pub connect: f64,
    pub send: f64,
    pub read: f64,
}

/// Set of backend nodes plus balancing policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub lb_type: Option<LoadBalancer>,
    /// Empty for upstreams resolved through service discovery.
    #[serde(
        default,
        deserialize_with = "deserialize_nodes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub nodes: Vec<UpstreamNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<UpstreamTimeout>,
    #[serde(default, skip_serializing)]
    pub create_time: Option<i64>,
    #[serde(default, skip_serializing)]
    pub update_time: Option<i64>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_resource!(Upstream, ResourceKind::Upstream, upstream);

/// Nodes are accepted both as a list of objects and in the compact
/// `{"host:port": weight}` form.
fn deserialize_nodes<'de, D>(deserializer: D) -> Result<Vec<UpstreamNode>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Nodes {
        List(Vec<UpstreamNode>),
        Map(BTreeMap<String, u32>),
    }

    match Nodes::deserialize(deserializer)? {
        Nodes::List(nodes) => Ok(nodes),
        Nodes::Map(map) => map
            .into_iter()
            .map(|(addr, weight)| {
                let (host, port) = addr.rsplit_once(':').ok_or_else(|| {
                    <D::Error as de::Error>::custom(format!("node '{addr}' has no port"))
                })?;
                let port = port.parse().map_err(|_| {
                    <D::Error as de::Error>::custom(format!("node '{addr}' has an invalid port"))
                })?;
                Ok::<_, D::Error>(UpstreamNode {
                    host: host.to_owned(),
                    port,
                    weight,
                })
            })
            .collect(),
    }
}

/// Shared configuration reused by several routes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub plugins: Plugins,
    #[serde(default, skip_serializing)]
    pub create_time: Option<i64>,
    #[serde(default, skip_serializing)]
    pub update_time: Option<i64>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_resource!(Service, ResourceKind::Service, service);

/// Certificate and key served for a set of SNIs.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ssl {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub cert: String,
    /// PEM private key. The admin API never returns it in clear, so a
    /// listed SSL usually carries an empty or encrypted value here.
    #[serde(default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snis: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(default, skip_serializing)]
    pub create_time: Option<i64>,
    #[serde(default, skip_serializing)]
    pub update_time: Option<i64>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_resource!(Ssl, ResourceKind::Ssl, ssl);

impl fmt::Debug for Ssl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ssl")
            .field("id", &self.id)
            .field("cert", &self.cert)
            .field("key", &"[REDACTED]")
            .field("snis", &self.snis)
            .field("status", &self.status)
            .field("create_time", &self.create_time)
            .field("update_time", &self.update_time)
            .finish_non_exhaustive()
    }
}
