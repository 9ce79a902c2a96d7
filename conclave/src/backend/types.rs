//! Wire types for the chat-completion endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of one `POST /chat/completions` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<String>,
}

/// The parts of a completion reply the engine uses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatCompletion {
    pub content: String,
    pub tokens_used: u64,
    /// Model that actually served the request, when reported.
    pub model: Option<String>,
}

impl ChatCompletion {
    /// Extract content and usage from a reply body.
    ///
    /// Unexpected shapes degrade to empty content and zero tokens.
    pub fn from_json(body: &Value) -> Self {
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();
        let tokens_used = body["usage"]["total_tokens"].as_u64().unwrap_or(0);
        let model = body["model"].as_str().map(str::to_string);

        Self {
            content,
            tokens_used,
            model,
        }
    }
}

/// One entry of the `GET /models` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ModelInfo {
    /// Case-insensitive match on id or display name.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.id.to_lowercase().contains(&term) || self.name.to_lowercase().contains(&term)
    }
}
