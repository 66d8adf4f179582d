use crate::client::HttpClient;
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::HttpResponse;
use bytes::Bytes;
use http::Request;
use http_body_util::Full;
use serde::Serialize;

/// Request builder with a fluent API
///
/// Created by [`HttpClient::get`], [`HttpClient::put`], etc.
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    client: HttpClient,
    method: http::Method,
    url: String,
    json_body: Option<Bytes>,
}

impl RequestBuilder {
    pub(crate) fn new(client: HttpClient, method: http::Method, url: String) -> Self {
        Self {
            client,
            method,
            url,
            json_body: None,
        }
    }

    /// Set the request body as JSON
    ///
    /// # Errors
    /// Returns `HttpError::Json` if serialization fails.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        self.json_body = Some(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    fn validate_url(&self) -> Result<http::Uri, HttpError> {
        let uri: http::Uri =
            self.url
                .parse()
                .map_err(|e: http::uri::InvalidUri| HttpError::InvalidUri {
                    url: self.url.clone(),
                    kind: InvalidUriKind::ParseError,
                    reason: e.to_string(),
                })?;

        if uri.authority().is_none() {
            return Err(HttpError::InvalidUri {
                url: self.url.clone(),
                kind: InvalidUriKind::MissingAuthority,
                reason: "missing host/authority".to_owned(),
            });
        }

        match uri.scheme_str() {
            Some("https") => Ok(uri),
            Some("http") => match self.client.config.transport {
                TransportSecurity::AllowInsecureHttp => Ok(uri),
                TransportSecurity::TlsOnly => Err(HttpError::InvalidScheme {
                    scheme: "http".to_owned(),
                    reason: "HTTPS required (transport security is TlsOnly)".to_owned(),
                }),
            },
            Some(scheme) => Err(HttpError::InvalidScheme {
                scheme: scheme.to_owned(),
                reason: "only http:// and https:// schemes are supported".to_owned(),
            }),
            None => Err(HttpError::InvalidUri {
                url: self.url.clone(),
                kind: InvalidUriKind::MissingScheme,
                reason: "missing scheme".to_owned(),
            }),
        }
    }

    /// Send the request
    ///
    /// Any status code is returned as `Ok`; the caller decides how to treat
    /// non-2xx responses.
    ///
    /// # Errors
    /// Returns `HttpError` on an invalid URL, transport failure, or when the
    /// response headers do not arrive within the request timeout.
    pub async fn send(self) -> Result<HttpResponse, HttpError> {
        let uri = self.validate_url()?;
        let mut builder = Request::builder()
            .method(self.method)
            .uri(uri)
            .header(http::header::USER_AGENT, self.client.user_agent.clone())
            .header(http::header::ACCEPT, "application/json");
        if self.json_body.is_some() {
            builder = builder.header(http::header::CONTENT_TYPE, "application/json");
        }

        let request = builder.body(Full::new(self.json_body.unwrap_or_default()))?;

        let timeout = self.client.config.request_timeout;
        let response = tokio::time::timeout(timeout, self.client.inner.request(request))
            .await
            .map_err(|_| HttpError::Timeout(timeout))??;

        Ok(HttpResponse {
            inner: response,
            max_body_size: self.client.config.max_body_size,
        })
    }
}
