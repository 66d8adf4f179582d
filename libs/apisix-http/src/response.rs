use crate::error::HttpError;
use bytes::Bytes;
use http::{Response, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;

/// HTTP response
///
/// Body reads enforce the client's `max_body_size`. The status code is not
/// checked here: admin error responses carry a JSON body the caller usually
/// wants to inspect.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<Incoming>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    /// Response status code
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Read the whole body
    ///
    /// # Errors
    /// Returns `HttpError::BodyTooLarge` if the body exceeds the limit, or
    /// `HttpError::Transport` if the connection fails mid-body.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        let limit = self.max_body_size;
        let collected = Limited::new(self.inner.into_body(), limit)
            .collect()
            .await
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    HttpError::BodyTooLarge { limit }
                } else {
                    HttpError::Transport(e)
                }
            })?;
        Ok(collected.to_bytes())
    }
}
