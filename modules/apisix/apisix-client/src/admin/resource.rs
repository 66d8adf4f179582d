use std::marker::PhantomData;
use std::sync::Arc;

use apisix_http::{HttpClient, HttpError, RequestBuilder};
use apisix_sdk::{ApisixError, CallContext, Resource, ResourceClient};
use async_trait::async_trait;
use bytes::Bytes;

use super::envelope;

/// Handler for one resource kind of an admin-API cluster.
pub(super) struct AdminResource<T> {
    cluster: Arc<str>,
    collection_url: String,
    http: HttpClient,
    _resource: PhantomData<fn() -> T>,
}

impl<T: Resource> AdminResource<T> {
    pub(super) fn new(cluster: Arc<str>, base_url: &str, http: HttpClient) -> Self {
        Self {
            cluster,
            collection_url: format!("{base_url}/{}", T::KIND.collection()),
            http,
            _resource: PhantomData,
        }
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url, urlencoding::encode(id))
    }

    fn require_id(resource: &T) -> Result<&str, ApisixError> {
        resource
            .id()
            .ok_or(ApisixError::MissingResourceId { kind: T::KIND })
    }

    /// Send the request and return the body of a 2xx response.
    ///
    /// `id` names the addressed item; a 404 without one means the collection
    /// itself is missing and is reported as a plain rejection.
    async fn execute(
        &self,
        request: RequestBuilder,
        id: Option<&str>,
    ) -> Result<Bytes, ApisixError> {
        let response = request.send().await.map_err(map_http_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_http_error)?;

        if status.is_success() {
            return Ok(body);
        }

        let message = envelope::error_message(&body);
        tracing::debug!(status = status.as_u16(), %message, "admin API rejected the request");

        Err(match (status.as_u16(), id) {
            (404, Some(id)) => ApisixError::ResourceNotFound {
                kind: T::KIND,
                id: id.to_owned(),
            },
            (409, _) => ApisixError::Conflict {
                kind: T::KIND,
                message,
            },
            (code, _) => ApisixError::Rejected {
                status: code,
                message,
            },
        })
    }
}

fn map_http_error(err: HttpError) -> ApisixError {
    match err {
        HttpError::Json(e) => ApisixError::Decode(e.to_string()),
        other => ApisixError::Transport(other.to_string()),
    }
}

#[async_trait]
impl<T: Resource> ResourceClient<T> for AdminResource<T> {
    #[tracing::instrument(skip_all, fields(cluster = %self.cluster, kind = %T::KIND))]
    async fn list(&self, ctx: &CallContext) -> Result<Vec<T>, ApisixError> {
        ctx.run(async {
            let body = self.execute(self.http.get(&self.collection_url), None).await?;
            let items: Vec<T> = envelope::decode_list(&body)?;
            tracing::debug!(count = items.len(), "listed resources");
            Ok(items)
        })
        .await
    }

    #[tracing::instrument(skip_all, fields(cluster = %self.cluster, kind = %T::KIND))]
    async fn create(&self, ctx: &CallContext, resource: &T) -> Result<T, ApisixError> {
        ctx.run(async {
            // A caller-chosen id is stored with PUT; otherwise the server assigns one.
            let id = resource.id();
            let request = match id {
                Some(id) => self.http.put(&self.item_url(id)),
                None => self.http.post(&self.collection_url),
            };
            let request = request.json(resource).map_err(map_http_error)?;

            let body = self.execute(request, id).await?;
            let created: T = envelope::decode_item(&body)?;
            tracing::info!(id = created.id().unwrap_or_default(), "resource created");
            Ok(created)
        })
        .await
    }

    #[tracing::instrument(skip_all, fields(cluster = %self.cluster, kind = %T::KIND))]
    async fn update(&self, ctx: &CallContext, resource: &T) -> Result<T, ApisixError> {
        let id = Self::require_id(resource)?;
        ctx.run(async {
            let request = self
                .http
                .put(&self.item_url(id))
                .json(resource)
                .map_err(map_http_error)?;

            let body = self.execute(request, Some(id)).await?;
            let updated: T = envelope::decode_item(&body)?;
            tracing::info!(id, "resource updated");
            Ok(updated)
        })
        .await
    }

    #[tracing::instrument(skip_all, fields(cluster = %self.cluster, kind = %T::KIND))]
    async fn delete(&self, ctx: &CallContext, resource: &T) -> Result<(), ApisixError> {
        let id = Self::require_id(resource)?;
        ctx.run(async {
            self.execute(self.http.delete(&self.item_url(id)), Some(id))
                .await?;
            tracing::info!(id, "resource deleted");
            Ok(())
        })
        .await
    }
}
