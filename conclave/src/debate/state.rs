//! Session model: responses, rounds, and the session aggregate.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RoundType;
use crate::error::SessionError;

/// One backend's reply within a round. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AIResponse {
    pub backend_key: String,
    pub backend_name: String,
    pub content: String,
    /// Scraped from the reply text; absent when no pattern matched.
    pub confidence: Option<f64>,
    pub tokens_used: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

impl AIResponse {
    pub fn new(
        backend_key: &str,
        backend_name: &str,
        content: &str,
        confidence: Option<f64>,
        tokens_used: Option<u64>,
    ) -> Self {
        Self {
            backend_key: backend_key.to_string(),
            backend_name: backend_name.to_string(),
            content: content.to_string(),
            confidence,
            tokens_used,
            timestamp: Utc::now(),
        }
    }

    pub fn tokens(&self) -> u64 {
        self.tokens_used.unwrap_or(0)
    }
}

/// One synchronized phase of a debate.
///
/// Responses are kept in backend invocation order. A round whose every call
/// failed is still recorded, with no responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateRound {
    /// 1-based, strictly increasing within a session.
    pub round_number: u32,
    pub round_type: RoundType,
    /// Display name from the mode definition.
    #[serde(default)]
    pub name: String,
    pub responses: Vec<AIResponse>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Set when the round type was not recognized and nothing was dispatched.
    #[serde(default)]
    pub skipped: bool,
    pub timestamp: DateTime<Utc>,
}

impl DebateRound {
    pub fn new(round_number: u32, round_type: RoundType, name: &str) -> Self {
        Self {
            round_number,
            round_type,
            name: name.to_string(),
            responses: Vec::new(),
            summary: None,
            skipped: false,
            timestamp: Utc::now(),
        }
    }

    pub fn with_responses(mut self, responses: Vec<AIResponse>) -> Self {
        self.responses = responses;
        self
    }

    pub fn tokens(&self) -> u64 {
        self.responses.iter().map(AIResponse::tokens).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Response from a given backend, if it answered in this round.
    pub fn response_from(&self, backend_key: &str) -> Option<&AIResponse> {
        self.responses.iter().find(|r| r.backend_key == backend_key)
    }
}

/// Root aggregate of one debate run.
///
/// `final_answer` and `completed_at` are set together by [`complete`](Self::complete)
/// and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateSession {
    pub session_id: String,
    pub user_id: String,
    pub question: String,
    pub mode: String,
    pub rounds: Vec<DebateRound>,
    pub final_answer: Option<String>,
    pub final_confidence: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_tokens: u64,
}

impl DebateSession {
    /// Create an empty session with a fresh identifier.
    pub fn new(user_id: &str, question: &str, mode: &str) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            question: question.to_string(),
            mode: mode.to_string(),
            rounds: Vec::new(),
            final_answer: None,
            final_confidence: None,
            started_at: Utc::now(),
            completed_at: None,
            total_tokens: 0,
        }
    }

    /// Append a round. Rejects out-of-order numbers and writes after completion.
    pub fn add_round(&mut self, round: DebateRound) -> Result<(), SessionError> {
        if self.is_complete() {
            return Err(SessionError::AlreadyComplete(self.session_id.clone()));
        }
        let last = self.last_round_number();
        if round.round_number <= last {
            return Err(SessionError::RoundOutOfOrder {
                last,
                got: round.round_number,
            });
        }
        self.rounds.push(round);
        Ok(())
    }

    /// Mark the session complete. Recomputes `total_tokens` from the rounds.
    pub fn complete(&mut self, final_answer: String, confidence: f64) -> Result<(), SessionError> {
        if self.is_complete() {
            return Err(SessionError::AlreadyComplete(self.session_id.clone()));
        }
        self.total_tokens = self.computed_total_tokens();
        self.final_answer = Some(final_answer);
        self.final_confidence = Some(confidence);
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Sum of `tokens_used` over every response, absent counted as zero.
    pub fn computed_total_tokens(&self) -> u64 {
        self.rounds.iter().map(DebateRound::tokens).sum()
    }

    pub fn last_round(&self) -> Option<&DebateRound> {
        self.rounds.last()
    }

    pub fn last_round_number(&self) -> u32 {
        self.rounds.last().map(|r| r.round_number).unwrap_or(0)
    }

    pub fn response_count(&self) -> usize {
        self.rounds.iter().map(|r| r.responses.len()).sum()
    }

    /// Wall time from start to completion, or to now while running.
    pub fn elapsed(&self) -> Duration {
        self.completed_at.unwrap_or_else(Utc::now) - self.started_at
    }
}
