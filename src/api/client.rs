//! HTTP implementation of [`QaBackend`]
//!
//! Talks plain JSON over HTTP to the Query GPT backend. Authenticated
//! endpoints carry `Authorization: Bearer <token>`.

use crate::api::types::{
    AskRequest, AskResponse, DeleteResponse, HistoryResponse, UserStats,
};
use crate::api::QaBackend;
use crate::config::ApiConfig;
use crate::error::{QueryGptError, Result};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const HEALTH_PATH: &str = "/health";
const ASK_PATH: &str = "/api/v1/qa/ask";
const HISTORY_PATH: &str = "/api/v1/qa/history";
const STATS_PATH: &str = "/api/v1/qa/stats";

/// Q&A backend client
///
/// # Examples
///
/// ```
/// use querygpt::api::QaClient;
/// use querygpt::config::ApiConfig;
///
/// let client = QaClient::new(&ApiConfig::default()).unwrap();
/// assert_eq!(client.base_url(), "http://localhost:8000");
/// ```
#[derive(Debug, Clone)]
pub struct QaClient {
    client: Client,
    base_url: String,
}

impl QaClient {
    /// Create a client for the configured backend
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("querygpt/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| QueryGptError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        tracing::debug!("Initialized Q&A client: base_url={}", base_url);

        Ok(Self { client, base_url })
    }

    /// Base URL requests are sent to, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Q&A backend unreachable: {}", e);
            QueryGptError::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        } else {
            body
        };
        Err(QueryGptError::from_status(status.as_u16(), message).into())
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse Q&A backend response: {}", e);
            QueryGptError::Backend(format!("Failed to parse response: {}", e)).into()
        })
    }
}

#[async_trait]
impl QaBackend for QaClient {
    async fn health(&self) -> Result<()> {
        let url = self.url(HEALTH_PATH);
        tracing::debug!("Probing {}", url);
        self.send(self.client.get(&url)).await.map(|_| ())
    }

    async fn ask(&self, token: &str, request: &AskRequest) -> Result<AskResponse> {
        tracing::debug!(
            provider = %request.llm_provider,
            chars = request.question.len(),
            "Submitting question"
        );
        let builder = self
            .client
            .post(self.url(ASK_PATH))
            .bearer_auth(token)
            .json(request);
        let response: AskResponse = self.send_json(builder).await?;

        if let Some(id) = response.session_id {
            tracing::debug!("Backend stored session {}", id);
        }
        if let Some(error) = response.error_message.as_deref().filter(|e| !e.is_empty()) {
            tracing::warn!("Backend reported an answer error: {}", error);
        }
        Ok(response)
    }

    async fn history(&self, token: &str, page: u32, size: u32) -> Result<HistoryResponse> {
        tracing::debug!("Fetching history page={} size={}", page, size);
        let builder = self
            .client
            .get(self.url(HISTORY_PATH))
            .query(&[("page", page), ("size", size)])
            .bearer_auth(token);
        self.send_json(builder).await
    }

    async fn delete_session(&self, token: &str, id: i64) -> Result<DeleteResponse> {
        let url = format!("{}/{}", self.url(HISTORY_PATH), id);
        self.send_json(self.client.delete(url).bearer_auth(token)).await
    }

    async fn clear_history(&self, token: &str) -> Result<DeleteResponse> {
        let builder = self.client.delete(self.url(HISTORY_PATH)).bearer_auth(token);
        self.send_json(builder).await
    }

    async fn stats(&self, token: &str) -> Result<UserStats> {
        let builder = self.client.get(self.url(STATS_PATH)).bearer_auth(token);
        self.send_json(builder).await
    }
}
