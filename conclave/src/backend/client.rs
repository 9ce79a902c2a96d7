//! Logical "ask a backend" operation: request building, retry, parsing.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::confidence::extract_confidence;
use super::transport::CompletionTransport;
use super::types::{ChatMessage, ChatRequest};
use crate::config::{ApiConfig, BackendRegistry};
use crate::debate::AIResponse;
use crate::error::{AttemptError, BackendError};
use crate::prompts::PromptTemplates;

/// Fixed-delay retry policy. `attempts` includes the first try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_api(api: &ApiConfig) -> Self {
        Self {
            attempts: api.retry_attempts.max(1),
            delay: api.retry_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct BackendClient {
    transport: Arc<dyn CompletionTransport>,
    registry: Arc<BackendRegistry>,
    prompts: Arc<PromptTemplates>,
    retry: RetryPolicy,
}

impl BackendClient {
    pub fn new(
        transport: Arc<dyn CompletionTransport>,
        registry: Arc<BackendRegistry>,
        prompts: Arc<PromptTemplates>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            registry,
            prompts,
            retry,
        }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn prompts(&self) -> &PromptTemplates {
        &self.prompts
    }

    /// Ask one backend. Generation parameters default to the backend profile.
    pub async fn call(
        &self,
        backend_key: &str,
        messages: Vec<ChatMessage>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> Result<AIResponse, BackendError> {
        let profile = self
            .registry
            .get(backend_key)
            .ok_or_else(|| BackendError::NotFound(backend_key.to_string()))?;

        let request = ChatRequest {
            model: profile.id.clone(),
            messages,
            temperature: temperature.unwrap_or(profile.temperature),
            max_tokens: max_tokens.unwrap_or(profile.max_tokens),
            reasoning_effort: profile.reasoning.clone(),
            verbosity: profile.verbosity.clone(),
        };

        debug!(
            backend = backend_key,
            model = %profile.id,
            messages = request.messages.len(),
            "sending completion request"
        );

        let mut last_error: Option<AttemptError> = None;
        for attempt in 1..=self.retry.attempts {
            match self.transport.complete(&request).await {
                Ok(completion) => {
                    let confidence = extract_confidence(&completion.content);
                    info!(
                        backend = backend_key,
                        served_by = completion.model.as_deref().unwrap_or(&profile.id),
                        attempt,
                        tokens = completion.tokens_used,
                        confidence = ?confidence,
                        "backend replied"
                    );
                    return Ok(AIResponse::new(
                        backend_key,
                        &profile.name,
                        &completion.content,
                        confidence,
                        Some(completion.tokens_used),
                    ));
                }
                Err(e) => {
                    warn!(
                        backend = backend_key,
                        attempt,
                        max_attempts = self.retry.attempts,
                        error = %e,
                        "backend attempt failed"
                    );
                    last_error = Some(e);
                    if attempt < self.retry.attempts {
                        tokio::time::sleep(self.retry.delay).await;
                    }
                }
            }
        }

        Err(BackendError::Unavailable {
            backend: backend_key.to_string(),
            attempts: self.retry.attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempt made".to_string()),
        })
    }

    /// Single-backend question outside of a debate.
    pub async fn ask(&self, backend_key: &str, question: &str) -> Result<AIResponse, BackendError> {
        let profile = self
            .registry
            .get(backend_key)
            .ok_or_else(|| BackendError::NotFound(backend_key.to_string()))?;
        let specialization = profile.specialization_text();

        let messages = vec![
            ChatMessage::system(self.prompts.get("system_base")),
            ChatMessage::user(self.prompts.render(
                "single_ask",
                &[
                    ("role", profile.role.as_str()),
                    ("specialization", specialization.as_str()),
                    ("question", question),
                ],
            )),
        ];

        self.call(backend_key, messages, None, None).await
    }
}
