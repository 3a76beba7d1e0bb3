//! HTTP implementation of the chat service transport

use super::types::{
    ChatReply, ChatRequest, ClearAck, ClearRequest, ErrorBody, HealthStatus, HistoryRecord,
};
use super::{ChatTransport, TransportError};
use crate::config::ClientConfig;
use crate::session_id::SessionId;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// JSON-over-HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                TransportError::network(format!("Base URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<R: DeserializeOwned>(response: Response) -> Result<R, TransportError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::status(status.as_u16(), error_message(status, &body)));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| TransportError::decode(format!("Malformed response: {e}")))
    }
}

/// Human-readable message for a non-2xx response
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(ErrorBody { detail }) = serde_json::from_str::<ErrorBody>(body) {
        let detail = match detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        return format!("HTTP {}: {detail}", status.as_u16());
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        let snippet: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("HTTP {}: {snippet}", status.as_u16())
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send_message(
        &self,
        text: &str,
        session_id: &SessionId,
    ) -> Result<ChatReply, TransportError> {
        let url = self.endpoint(&["api", "chat"])?;
        let response = self
            .client
            .post(url)
            .json(&ChatRequest {
                message: text,
                session_id: session_id.as_str(),
            })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn fetch_history(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, TransportError> {
        let url = self.endpoint(&["api", "history", session_id.as_str()])?;
        let response = self
            .client
            .get(url)
            .query(&[("limit", limit)])
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn clear_session(&self, session_id: &SessionId) -> Result<ClearAck, TransportError> {
        let url = self.endpoint(&["api", "clear"])?;
        let response = self
            .client
            .post(url)
            .json(&ClearRequest {
                session_id: session_id.as_str(),
            })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn health_check(&self) -> Result<HealthStatus, TransportError> {
        let url = self.endpoint(&["api", "health"])?;
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }
}
