//! One-attempt transport seam and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::types::{ChatCompletion, ChatRequest, ModelInfo};
use crate::config::ApiConfig;
use crate::error::{AttemptError, ConfigError};

/// Error bodies longer than this are cut before they land in logs.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// A single request attempt against the completion endpoint.
///
/// Implementations must not retry; [`super::BackendClient`] owns the retry policy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, AttemptError>;
}

/// `reqwest`-backed transport for OpenAI-compatible gateways.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    referer: Option<String>,
    title: Option<String>,
}

impl HttpTransport {
    pub fn new(api: &ApiConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            api_key: api.api_key.clone(),
            timeout: api.timeout(),
            referer: api.referer.clone(),
            title: api.title.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut builder = builder.bearer_auth(&self.api_key);
        if let Some(referer) = &self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            builder = builder.header("X-Title", title);
        }
        builder
    }

    /// Send a prepared request and return the parsed JSON body, bounded by the timeout.
    async fn fetch_json(&self, builder: reqwest::RequestBuilder) -> Result<Value, AttemptError> {
        let exchange = async {
            let response = builder
                .send()
                .await
                .map_err(|e| AttemptError::Transport(e.to_string()))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| AttemptError::Transport(e.to_string()))?;

            if !status.is_success() {
                return Err(AttemptError::Status {
                    status: status.as_u16(),
                    body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
                });
            }

            serde_json::from_str::<Value>(&text)
                .map_err(|e| AttemptError::MalformedBody(e.to_string()))
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| AttemptError::Timeout(self.timeout))?
    }

    /// List models offered by the gateway, optionally filtered by a search term.
    pub async fn list_models(&self, search: Option<&str>) -> Result<Vec<ModelInfo>, AttemptError> {
        let url = format!("{}/models", self.base_url);
        let body = self.fetch_json(self.with_headers(self.client.get(&url))).await?;

        let models: Vec<ModelInfo> = match body.get("data") {
            Some(data) => serde_json::from_value(data.clone())
                .map_err(|e| AttemptError::MalformedBody(e.to_string()))?,
            None => Vec::new(),
        };
        debug!(count = models.len(), "model listing received");

        Ok(match search {
            Some(term) => models.into_iter().filter(|m| m.matches(term)).collect(),
            None => models,
        })
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, AttemptError> {
        let url = format!("{}/chat/completions", self.base_url);
        let builder = self.with_headers(self.client.post(&url)).json(request);
        let body = self.fetch_json(builder).await?;
        Ok(ChatCompletion::from_json(&body))
    }
}
