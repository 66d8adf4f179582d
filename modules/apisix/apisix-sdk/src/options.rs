//! Options a cluster is built from.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Name and connection parameters of one cluster.
///
/// Only `name` is retained by the registry; the rest is consumed by the
/// cluster factory.
///
/// ```yaml
/// name: prod
/// base_url: http://10.0.0.7:9180/apisix/admin
/// timeout: 5s
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterOptions {
    /// Unique cluster name.
    pub name: String,

    /// Admin API prefix, e.g. `http://127.0.0.1:9180/apisix/admin`.
    pub base_url: String,

    /// Per-request timeout (humantime format, default `10s`).
    #[serde(default = "default_timeout", with = "humantime_duration")]
    pub timeout: Duration,

    /// Response body limit in bytes; the transport default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_body_size: Option<usize>,

    /// User-Agent override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl ClusterOptions {
    #[must_use]
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            max_body_size: None,
            user_agent: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self::new("default", "http://127.0.0.1:9180/apisix/admin")
    }
}

/// Serde adapter for `Duration` in humantime notation (`500ms`, `5s`, `1m`).
mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&humantime::format_duration(*d))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(de::Error::custom)
    }
}
