//! Layered CLI configuration: defaults, then the YAML file, then `APISIX__*`
//! environment variables.

use std::path::Path;

use anyhow::{Context, Result, bail};
use apisix_client::ApisixClientConfig;
use apisix_sdk::ClusterOptions;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Environment prefix; `APISIX__DEFAULT_CLUSTER__BASE_URL` sets
/// `default_cluster.base_url`.
pub const ENV_PREFIX: &str = "APISIX__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CtlConfig {
    #[serde(default)]
    pub default_cluster: ClusterOptions,
    #[serde(default)]
    pub clusters: Vec<ClusterOptions>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info` or `warn,apisix_client=debug`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_level() -> String {
    "warn".to_owned()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl CtlConfig {
    /// Load configuration, failing if an explicitly named file is missing.
    ///
    /// # Errors
    /// Missing file, unreadable YAML, or values of the wrong shape.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }

    #[must_use]
    pub fn client_config(&self) -> ApisixClientConfig {
        ApisixClientConfig {
            default_cluster: self.default_cluster.clone(),
            clusters: self.clusters.clone(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn defaults_without_file() {
        let cfg = CtlConfig::load(None).unwrap();
        assert_eq!(cfg.default_cluster.name, "default");
        assert_eq!(cfg.logging.format, LogFormat::Text);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = CtlConfig::load(Some(Path::new("/nonexistent/apisix.yaml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "default_cluster:\n  name: main\n  base_url: http://10.0.0.1:9180/apisix/admin\n\
             clusters:\n  - name: edge\n    base_url: https://edge:9180/apisix/admin\n    timeout: 2s\n\
             logging:\n  level: debug\n  format: json"
        )
        .unwrap();

        let cfg = CtlConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.default_cluster.name, "main");
        assert_eq!(cfg.clusters[0].timeout, Duration::from_secs(2));
        assert_eq!(cfg.logging.format, LogFormat::Json);

        let client = cfg.client_config();
        assert_eq!(client.clusters.len(), 1);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "defualt_cluster:\n  name: typo").unwrap();
        assert!(CtlConfig::load(Some(file.path())).is_err());
    }
}
