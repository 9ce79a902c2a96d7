//! Concurrent fan-out of backend calls with a join barrier.
//!
//! Every call is spawned into one [`JoinSet`]; the fan-out returns only after
//! all of them have settled. Failed or panicked calls are dropped from the
//! result. Survivors come back in input order, not arrival order.
//!
//! Cancelling the token aborts every still-running call and yields
//! [`ConclaveError::Cancelled`].

use std::collections::HashSet;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::client::BackendClient;
use super::types::ChatMessage;
use crate::debate::AIResponse;
use crate::error::{BackendError, ConclaveError};

/// One backend and the messages it should receive.
#[derive(Debug, Clone)]
pub struct BackendCall {
    pub backend_key: String,
    pub messages: Vec<ChatMessage>,
}

impl BackendCall {
    pub fn new(backend_key: &str, messages: Vec<ChatMessage>) -> Self {
        Self {
            backend_key: backend_key.to_string(),
            messages,
        }
    }
}

#[derive(Clone)]
pub struct FanOut {
    client: BackendClient,
}

impl FanOut {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    /// Send the same messages to every key.
    pub async fn call_all(
        &self,
        backend_keys: &[String],
        messages: Vec<ChatMessage>,
        cancel: &CancellationToken,
    ) -> Result<Vec<AIResponse>, ConclaveError> {
        let calls = backend_keys
            .iter()
            .map(|key| BackendCall::new(key, messages.clone()))
            .collect();
        self.call_many(calls, cancel).await
    }

    /// Run every call concurrently and collect the successes in input order.
    ///
    /// Repeated backend keys are collapsed to their first occurrence.
    pub async fn call_many(
        &self,
        calls: Vec<BackendCall>,
        cancel: &CancellationToken,
    ) -> Result<Vec<AIResponse>, ConclaveError> {
        if cancel.is_cancelled() {
            return Err(ConclaveError::Cancelled);
        }

        let mut seen = HashSet::new();
        let calls: Vec<BackendCall> = calls
            .into_iter()
            .filter(|c| seen.insert(c.backend_key.clone()))
            .collect();

        let mut join_set: JoinSet<(usize, Result<AIResponse, BackendError>)> = JoinSet::new();
        for (idx, call) in calls.iter().enumerate() {
            let client = self.client.clone();
            let key = call.backend_key.clone();
            let messages = call.messages.clone();
            join_set.spawn(async move { (idx, client.call(&key, messages, None, None).await) });
        }

        let mut slots: Vec<Option<AIResponse>> = vec![None; calls.len()];
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    join_set.abort_all();
                    warn!(pending = join_set.len(), "fan-out cancelled");
                    return Err(ConclaveError::Cancelled);
                }
                next = join_set.join_next() => match next {
                    None => break,
                    Some(Ok((idx, Ok(response)))) => slots[idx] = Some(response),
                    Some(Ok((idx, Err(e)))) => {
                        warn!(backend = %calls[idx].backend_key, error = %e, "backend dropped from round");
                    }
                    Some(Err(e)) => {
                        // Panic in a call task: treated like a failed call.
                        warn!(error = %e, "backend call task panicked");
                    }
                },
            }
        }

        let responses: Vec<AIResponse> = slots.into_iter().flatten().collect();
        debug!(
            requested = calls.len(),
            succeeded = responses.len(),
            "fan-out settled"
        );
        Ok(responses)
    }
}
