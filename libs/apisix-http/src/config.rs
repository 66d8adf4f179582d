use std::time::Duration;

/// Default User-Agent string for admin requests
pub(crate) const DEFAULT_USER_AGENT: &str = concat!("apisix-http/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default response body limit (10 MiB)
const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Which URL schemes the client accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportSecurity {
    /// Only `https://` URLs are accepted.
    #[default]
    TlsOnly,
    /// Both `http://` and `https://` URLs are accepted.
    ///
    /// Admin endpoints are frequently bound to a loopback or cluster-internal
    /// address without TLS, so this is chosen per cluster from its base URL.
    AllowInsecureHttp,
}

/// Source of trusted root certificates for TLS connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsRootConfig {
    /// Mozilla roots compiled into the binary.
    #[default]
    WebPki,
    /// Roots from the operating system certificate store (loaded once).
    Native,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Timeout for a single request, including reading response headers (default: 10s)
    pub request_timeout: Duration,

    /// User-Agent header value
    pub user_agent: String,

    /// Maximum accepted response body size in bytes (default: 10 MiB)
    pub max_body_size: usize,

    /// Idle pooled connections are closed after this long (`None` keeps them)
    pub pool_idle_timeout: Option<Duration>,

    /// Maximum idle connections kept per host
    pub pool_max_idle_per_host: usize,

    /// Accepted URL schemes
    pub transport: TransportSecurity,

    /// Root certificate source for HTTPS
    pub tls_roots: TlsRootConfig,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 8,
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::WebPki,
        }
    }
}
