use std::sync::Arc;

use api_types::ErrorBody;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::{
    error::{ClientError, Result},
    session::SessionContext,
};

/// HTTP client for the persistence API.
///
/// Cheap to clone: the connection pool and the session are shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: Arc<SessionContext>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<SessionContext>) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "unsupported scheme {}",
                parsed.scheme()
            )));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Attaches the bearer token, failing before any I/O when there is none.
    pub(crate) fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.session.token().ok_or(ClientError::MissingToken)?;
        Ok(request.bearer_auth(token))
    }

    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|err| {
            tracing::warn!("request failed: {err}");
            ClientError::Transport(err)
        })?;

        let status = response.status();
        tracing::debug!(url = %response.url(), status = status.as_u16(), "response");
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        tracing::warn!(status = status.as_u16(), %message, "request rejected");
        Err(ClientError::from_status(status.as_u16(), message))
    }

    /// Sends the request and decodes a JSON body. An empty body yields `None`.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await.map_err(ClientError::Transport)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| ClientError::Malformed(err.to_string()))
    }

    /// Like [`send_json`](Self::send_json) for list endpoints: an empty body is
    /// an empty list.
    pub(crate) async fn send_list<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Vec<T>> {
        Ok(self.send_json(request).await?.unwrap_or_default())
    }

    /// Like [`send_json`](Self::send_json) for endpoints that must return a
    /// record.
    pub(crate) async fn send_record<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T> {
        self.send_json(request)
            .await?
            .ok_or_else(|| ClientError::Malformed("empty response body".to_string()))
    }
}
