//! Debate orchestrator: drives a mode's round structure end to end.
//!
//! Rounds run strictly in declared order; only the calls inside a round run
//! concurrently. A failed `final_synthesis` stops the remaining rounds and
//! the final answer falls back to the best available response.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::context::format_rounds;
use super::final_answer::{AnswerSource, FinalAnswer};
use super::persistence::SessionStore;
use super::rounds::{RoundOutcome, RoundRunner};
use super::state::DebateSession;
use crate::backend::{BackendClient, CompletionTransport, FanOut, RetryPolicy};
use crate::config::{ConclaveConfig, ModeRegistry, RoundType};
use crate::error::{ConclaveError, ConclaveResult};
use crate::prompts::PromptTemplates;

pub struct DebateOrchestrator {
    runner: RoundRunner,
    modes: Arc<ModeRegistry>,
    default_mode: String,
    store: Option<SessionStore>,
}

impl DebateOrchestrator {
    /// Assemble from explicitly constructed parts. `store = None` skips persistence.
    pub fn new(
        client: BackendClient,
        modes: Arc<ModeRegistry>,
        synthesizer: &str,
        default_mode: &str,
        store: Option<SessionStore>,
    ) -> Self {
        Self {
            runner: RoundRunner::new(FanOut::new(client), synthesizer),
            modes,
            default_mode: default_mode.to_string(),
            store,
        }
    }

    /// Build every component from a validated configuration.
    pub fn from_config(config: &ConclaveConfig, transport: Arc<dyn CompletionTransport>) -> Self {
        let client = BackendClient::new(
            transport,
            Arc::new(config.backends.clone()),
            Arc::new(PromptTemplates::with_defaults(&config.prompts)),
            RetryPolicy::from_api(&config.api),
        );
        Self::new(
            client,
            Arc::new(config.modes.clone()),
            &config.debate.synthesizer,
            &config.debate.default_mode,
            Some(SessionStore::new(config.storage.sessions_dir.clone())),
        )
    }

    pub fn client(&self) -> &BackendClient {
        self.runner.fan_out().client()
    }

    pub fn modes(&self) -> &ModeRegistry {
        &self.modes
    }

    pub fn store(&self) -> Option<&SessionStore> {
        self.store.as_ref()
    }

    /// Run a debate that can only end on its own.
    pub async fn run(
        &self,
        user_id: &str,
        question: &str,
        mode: &str,
        backend_keys: Option<&[String]>,
    ) -> ConclaveResult<DebateSession> {
        self.run_with_cancel(user_id, question, mode, backend_keys, &CancellationToken::new())
            .await
    }

    /// Run a debate. The token is checked between rounds and aborts in-flight calls.
    pub async fn run_with_cancel(
        &self,
        user_id: &str,
        question: &str,
        mode: &str,
        backend_keys: Option<&[String]>,
        cancel: &CancellationToken,
    ) -> ConclaveResult<DebateSession> {
        let started = Instant::now();
        let mode = self.modes.resolve(mode, &self.default_mode)?;
        let keys = self.resolve_backends(backend_keys);

        let mut session = DebateSession::new(user_id, question, &mode.key);
        info!(
            session = %session.session_id,
            mode = %mode.key,
            backends = ?keys,
            rounds = mode.rounds.len(),
            "debate started"
        );

        let mut synthesis_failed = false;
        for spec in &mode.rounds {
            if cancel.is_cancelled() {
                warn!(session = %session.session_id, round = spec.round, "debate cancelled");
                return Err(ConclaveError::Cancelled);
            }

            match self
                .runner
                .run(spec, question, &keys, &session, cancel)
                .await?
            {
                RoundOutcome::Recorded(round) | RoundOutcome::Skipped(round) => {
                    session.add_round(round)?;
                }
                RoundOutcome::SynthesisFailed => {
                    synthesis_failed = true;
                    break;
                }
            }
        }

        let answer = self
            .final_answer(&session, mode.ends_with_final_synthesis(), synthesis_failed, cancel)
            .await?;

        info!(
            session = %session.session_id,
            source = ?answer.source,
            confidence = answer.confidence,
            "final answer selected"
        );
        session.complete(answer.content, answer.confidence)?;

        if let Some(store) = &self.store {
            store.save(&session)?;
        }

        info!(
            session = %session.session_id,
            rounds = session.rounds.len(),
            tokens = session.total_tokens,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "debate complete"
        );
        Ok(session)
    }

    /// De-duplicate requested keys and drop unknown ones; `None` means every backend.
    fn resolve_backends(&self, requested: Option<&[String]>) -> Vec<String> {
        let registry = self.client().registry();
        let Some(requested) = requested else {
            return registry.keys();
        };

        let mut keys: Vec<String> = Vec::with_capacity(requested.len());
        for key in requested {
            if keys.contains(key) {
                continue;
            }
            if !registry.contains(key) {
                warn!(backend = %key, "unknown backend requested, skipping");
                continue;
            }
            keys.push(key.clone());
        }
        keys
    }

    async fn final_answer(
        &self,
        session: &DebateSession,
        ends_with_final_synthesis: bool,
        synthesis_failed: bool,
        cancel: &CancellationToken,
    ) -> ConclaveResult<FinalAnswer> {
        if synthesis_failed {
            return Ok(FinalAnswer::from_best_available(session));
        }

        if ends_with_final_synthesis {
            if let Some(answer) = session
                .last_round()
                .filter(|r| r.round_type == RoundType::FinalSynthesis)
                .and_then(FinalAnswer::from_final_round)
            {
                return Ok(answer);
            }
        }

        if session.response_count() == 0 {
            warn!(session = %session.session_id, "no backend answered in any round");
            return Ok(FinalAnswer::from_best_available(session));
        }

        let all_debate_data = format_rounds(&session.rounds, self.client().registry());
        let synthesis = self
            .runner
            .synthesize(
                "fallback_synthesis",
                &[
                    ("question", session.question.as_str()),
                    ("all_debate_data", all_debate_data.as_str()),
                ],
                cancel,
            )
            .await?;

        Ok(match synthesis {
            Some(response) => FinalAnswer::from_synthesis(&response),
            None => {
                let answer = FinalAnswer::from_best_available(session);
                if let AnswerSource::BestResponse { backend_key } = &answer.source {
                    warn!(
                        session = %session.session_id,
                        backend = %backend_key,
                        "fallback synthesis failed, using best response"
                    );
                }
                answer
            }
        })
    }
}
