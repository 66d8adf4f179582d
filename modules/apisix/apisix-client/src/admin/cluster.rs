use std::fmt;
use std::sync::Arc;

use apisix_http::{HttpClient, TlsRootConfig, TransportSecurity};
use apisix_sdk::{
    ApisixError, Cluster, ClusterOptions, Route, RouteClient, Service, ServiceClient, Ssl,
    SslClient, Upstream, UpstreamClient,
};
use url::Url;

use super::resource::AdminResource;
use crate::factory::ClusterFactory;

/// A cluster reached through its admin API.
pub struct AdminCluster {
    name: Arc<str>,
    base_url: String,
    route: Arc<AdminResource<Route>>,
    upstream: Arc<AdminResource<Upstream>>,
    service: Arc<AdminResource<Service>>,
    ssl: Arc<AdminResource<Ssl>>,
}

impl AdminCluster {
    /// `base_url` is the admin API prefix without a trailing slash.
    #[must_use]
    pub fn new(name: &str, base_url: &str, http: &HttpClient) -> Self {
        let name: Arc<str> = Arc::from(name);
        Self {
            route: Arc::new(AdminResource::new(name.clone(), base_url, http.clone())),
            upstream: Arc::new(AdminResource::new(name.clone(), base_url, http.clone())),
            service: Arc::new(AdminResource::new(name.clone(), base_url, http.clone())),
            ssl: Arc::new(AdminResource::new(name.clone(), base_url, http.clone())),
            base_url: base_url.to_owned(),
            name,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Cluster for AdminCluster {
    fn name(&self) -> &str {
        &self.name
    }

    fn route(&self) -> Arc<RouteClient> {
        self.route.clone()
    }

    fn upstream(&self) -> Arc<UpstreamClient> {
        self.upstream.clone()
    }

    fn service(&self) -> Arc<ServiceClient> {
        self.service.clone()
    }

    fn ssl(&self) -> Arc<SslClient> {
        self.ssl.clone()
    }
}

impl fmt::Debug for AdminCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCluster")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Builds [`AdminCluster`]s from [`ClusterOptions`].
///
/// The base URL must be an absolute `http` or `https` URL with a host and
/// without query or fragment. Plain HTTP is permitted only for clusters whose
/// base URL asks for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminClusterFactory {
    tls_roots: TlsRootConfig,
}

impl AdminClusterFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trust roots for `https` clusters.
    #[must_use]
    pub fn with_tls_roots(mut self, tls_roots: TlsRootConfig) -> Self {
        self.tls_roots = tls_roots;
        self
    }

    fn validate(options: &ClusterOptions) -> Result<Url, ApisixError> {
        let invalid = |reason: String| ApisixError::InvalidClusterOptions {
            name: options.name.clone(),
            reason,
        };

        if options.name.trim().is_empty() {
            return Err(invalid("cluster name is empty".to_owned()));
        }
        if options.timeout.is_zero() {
            return Err(invalid("timeout must be greater than zero".to_owned()));
        }

        let url = Url::parse(&options.base_url)
            .map_err(|e| invalid(format!("base_url '{}': {e}", options.base_url)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "base_url scheme '{}' is not http or https",
                url.scheme()
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("base_url has no host".to_owned()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid(
                "base_url must not carry a query or fragment".to_owned(),
            ));
        }

        Ok(url)
    }
}

impl ClusterFactory for AdminClusterFactory {
    #[tracing::instrument(skip_all, fields(cluster = %options.name))]
    fn build(&self, options: &ClusterOptions) -> Result<Arc<dyn Cluster>, ApisixError> {
        let url = Self::validate(options)?;

        let transport = if url.scheme() == "http" {
            TransportSecurity::AllowInsecureHttp
        } else {
            TransportSecurity::TlsOnly
        };

        let mut builder = HttpClient::builder()
            .timeout(options.timeout)
            .transport(transport)
            .tls_roots(self.tls_roots);
        if let Some(limit) = options.max_body_size {
            builder = builder.max_body_size(limit);
        }
        if let Some(user_agent) = &options.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let http = builder
            .build()
            .map_err(|e| ApisixError::InvalidClusterOptions {
                name: options.name.clone(),
                reason: e.to_string(),
            })?;

        let base_url = url.as_str().trim_end_matches('/');
        tracing::debug!(base_url, ?transport, "admin cluster built");

        Ok(Arc::new(AdminCluster::new(&options.name, base_url, &http)))
    }
}
