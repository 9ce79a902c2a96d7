//! Round-type state machine.
//!
//! Each round type turns the question, the participating backends and the
//! session so far into one [`DebateRound`]:
//!
//! | Round type                  | Context                      | Calls                         |
//! |-----------------------------|------------------------------|-------------------------------|
//! | `independent_generation`    | none                         | every backend                 |
//! | `mutual_critique`           | previous round, self excluded | every backend                |
//! | `critique_and_synthesis`    | previous round + critiques   | every backend, then synthesizer |
//! | `improvement`               | own round 1 answer + round 2 critiques of others | every backend |
//! | `improvement_and_synthesis` | all rounds + improvements    | every backend, then synthesizer |
//! | `consensus_building`        | latest round, self included  | every backend                 |
//! | `final_synthesis`           | whole session + counters     | synthesizer only              |
//!
//! Unrecognized round types dispatch nothing and come back as [`RoundOutcome::Skipped`].

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::backend::{BackendCall, ChatMessage, FanOut};
use crate::config::{RoundSpec, RoundType};
use crate::error::ConclaveError;

use super::context::{format_responses, format_rounds, format_stages};
use super::state::{AIResponse, DebateRound, DebateSession};

const NO_PREVIOUS_ANSWER: &str = "(you gave no answer in the first round)";

/// Result of dispatching one round specification.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    /// The round ran; it may still hold zero responses.
    Recorded(DebateRound),
    /// Unknown round type; nothing was dispatched.
    Skipped(DebateRound),
    /// A `final_synthesis` call failed. The session should stop here.
    SynthesisFailed,
}

pub struct RoundRunner {
    fan_out: FanOut,
    synthesizer: String,
}

impl RoundRunner {
    pub fn new(fan_out: FanOut, synthesizer: &str) -> Self {
        Self {
            fan_out,
            synthesizer: synthesizer.to_string(),
        }
    }

    pub fn synthesizer(&self) -> &str {
        &self.synthesizer
    }

    pub fn fan_out(&self) -> &FanOut {
        &self.fan_out
    }

    /// Dispatch one round. `session` holds every round recorded so far.
    pub async fn run(
        &self,
        spec: &RoundSpec,
        question: &str,
        backend_keys: &[String],
        session: &DebateSession,
        cancel: &CancellationToken,
    ) -> Result<RoundOutcome, ConclaveError> {
        info!(
            round = spec.round,
            round_type = %spec.round_type,
            name = %spec.name,
            backends = backend_keys.len(),
            "starting round"
        );

        let outcome = match &spec.round_type {
            RoundType::IndependentGeneration => RoundOutcome::Recorded(
                self.independent_generation(spec, question, backend_keys, cancel)
                    .await?,
            ),
            RoundType::MutualCritique => {
                let previous = previous_responses(session);
                RoundOutcome::Recorded(
                    self.mutual_critique(spec, question, backend_keys, previous, cancel)
                        .await?,
                )
            }
            RoundType::CritiqueAndSynthesis => RoundOutcome::Recorded(
                self.critique_and_synthesis(spec, question, backend_keys, session, cancel)
                    .await?,
            ),
            RoundType::Improvement => RoundOutcome::Recorded(
                self.improvement(spec, question, backend_keys, session, cancel)
                    .await?,
            ),
            RoundType::ImprovementAndSynthesis => RoundOutcome::Recorded(
                self.improvement_and_synthesis(spec, question, backend_keys, session, cancel)
                    .await?,
            ),
            RoundType::ConsensusBuilding => RoundOutcome::Recorded(
                self.consensus_building(spec, question, backend_keys, session, cancel)
                    .await?,
            ),
            RoundType::FinalSynthesis => {
                self.final_synthesis(spec, question, session, cancel).await?
            }
            RoundType::Unrecognized(name) => {
                warn!(round = spec.round, round_type = %name, "unknown round type, skipping");
                let mut round = DebateRound::new(spec.round, spec.round_type.clone(), &spec.name);
                round.skipped = true;
                round.summary = Some(format!("skipped: unknown round type '{name}'"));
                RoundOutcome::Skipped(round)
            }
        };

        match &outcome {
            RoundOutcome::Recorded(round) => info!(
                round = round.round_number,
                responses = round.responses.len(),
                tokens = round.tokens(),
                "round finished"
            ),
            RoundOutcome::Skipped(_) => {}
            RoundOutcome::SynthesisFailed => {
                warn!(round = spec.round, "final synthesis failed")
            }
        }

        Ok(outcome)
    }

    // ── Prompt helpers ──────────────────────────────────────────────────────

    fn system_message(&self) -> ChatMessage {
        ChatMessage::system(self.fan_out.client().prompts().get("system_base"))
    }

    /// Render `template` for one backend, adding its role and specialization.
    fn backend_call(&self, key: &str, template: &str, values: &[(&str, &str)]) -> BackendCall {
        let registry = self.fan_out.client().registry();
        let (role, specialization) = match registry.get(key) {
            Some(profile) => (profile.role.clone(), profile.specialization_text()),
            None => ("Analyst".to_string(), String::new()),
        };

        let mut all: Vec<(&str, &str)> = vec![
            ("role", role.as_str()),
            ("specialization", specialization.as_str()),
        ];
        all.extend_from_slice(values);

        let prompt = self.fan_out.client().prompts().render(template, &all);
        BackendCall::new(key, vec![self.system_message(), ChatMessage::user(prompt)])
    }

    /// Ask the synthesizer once. `None` when the call failed.
    pub(crate) async fn synthesize(
        &self,
        template: &str,
        values: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> Result<Option<AIResponse>, ConclaveError> {
        let call = self.backend_call(&self.synthesizer, template, values);
        let mut responses = self.fan_out.call_many(vec![call], cancel).await?;
        Ok(responses.pop())
    }

    // ── Round handlers ──────────────────────────────────────────────────────

    async fn independent_generation(
        &self,
        spec: &RoundSpec,
        question: &str,
        backend_keys: &[String],
        cancel: &CancellationToken,
    ) -> Result<DebateRound, ConclaveError> {
        let calls = backend_keys
            .iter()
            .map(|key| self.backend_call(key, "round_1_independent", &[("question", question)]))
            .collect();

        let responses = self.fan_out.call_many(calls, cancel).await?;
        Ok(DebateRound::new(spec.round, spec.round_type.clone(), &spec.name).with_responses(responses))
    }

    async fn mutual_critique(
        &self,
        spec: &RoundSpec,
        question: &str,
        backend_keys: &[String],
        previous: &[AIResponse],
        cancel: &CancellationToken,
    ) -> Result<DebateRound, ConclaveError> {
        let registry = self.fan_out.client().registry();
        let calls = backend_keys
            .iter()
            .map(|key| {
                let others: Vec<AIResponse> = previous
                    .iter()
                    .filter(|r| &r.backend_key != key)
                    .cloned()
                    .collect();
                let other_responses = format_responses(&others, registry);
                self.backend_call(
                    key,
                    "round_2_critique",
                    &[("question", question), ("other_responses", other_responses.as_str())],
                )
            })
            .collect();

        let responses = self.fan_out.call_many(calls, cancel).await?;
        Ok(DebateRound::new(spec.round, spec.round_type.clone(), &spec.name).with_responses(responses))
    }

    async fn critique_and_synthesis(
        &self,
        spec: &RoundSpec,
        question: &str,
        backend_keys: &[String],
        session: &DebateSession,
        cancel: &CancellationToken,
    ) -> Result<DebateRound, ConclaveError> {
        let previous = previous_responses(session);
        let mut round = self
            .mutual_critique(spec, question, backend_keys, previous, cancel)
            .await?;

        let debate_data = format_stages(
            &[previous, round.responses.as_slice()],
            self.fan_out.client().registry(),
        );
        let synthesis = self
            .synthesize(
                "stage_synthesis",
                &[("question", question), ("debate_data", debate_data.as_str())],
                cancel,
            )
            .await?;

        self.append_synthesis(&mut round, synthesis);
        Ok(round)
    }

    async fn improvement(
        &self,
        spec: &RoundSpec,
        question: &str,
        backend_keys: &[String],
        session: &DebateSession,
        cancel: &CancellationToken,
    ) -> Result<DebateRound, ConclaveError> {
        let registry = self.fan_out.client().registry();
        // First two rounds that actually ran: initial answers, then critiques.
        let mut ran = session.rounds.iter().filter(|r| !r.skipped);
        let initial_round = ran.next();
        let critiques = ran.next().map(|r| r.responses.as_slice()).unwrap_or_default();

        let calls = backend_keys
            .iter()
            .map(|key| {
                let own = initial_round
                    .and_then(|r| r.response_from(key))
                    .map(|r| r.content.as_str())
                    .unwrap_or(NO_PREVIOUS_ANSWER);
                let received: Vec<AIResponse> = critiques
                    .iter()
                    .filter(|r| &r.backend_key != key)
                    .cloned()
                    .collect();
                let critique_received = format_responses(&received, registry);
                self.backend_call(
                    key,
                    "round_3_improvement",
                    &[
                        ("question", question),
                        ("your_previous_response", own),
                        ("critique_received", critique_received.as_str()),
                    ],
                )
            })
            .collect();

        let responses = self.fan_out.call_many(calls, cancel).await?;
        Ok(DebateRound::new(spec.round, spec.round_type.clone(), &spec.name).with_responses(responses))
    }

    async fn improvement_and_synthesis(
        &self,
        spec: &RoundSpec,
        question: &str,
        backend_keys: &[String],
        session: &DebateSession,
        cancel: &CancellationToken,
    ) -> Result<DebateRound, ConclaveError> {
        let mut round = self
            .improvement(spec, question, backend_keys, session, cancel)
            .await?;

        let mut history = session.rounds.clone();
        history.push(round.clone());
        let all_debate_data = format_rounds(&history, self.fan_out.client().registry());

        let synthesis = self
            .synthesize(
                "history_synthesis",
                &[("question", question), ("all_debate_data", all_debate_data.as_str())],
                cancel,
            )
            .await?;

        self.append_synthesis(&mut round, synthesis);
        Ok(round)
    }

    async fn consensus_building(
        &self,
        spec: &RoundSpec,
        question: &str,
        backend_keys: &[String],
        session: &DebateSession,
        cancel: &CancellationToken,
    ) -> Result<DebateRound, ConclaveError> {
        let improved = format_responses(
            previous_responses(session),
            self.fan_out.client().registry(),
        );
        let calls = backend_keys
            .iter()
            .map(|key| {
                self.backend_call(
                    key,
                    "round_4_consensus",
                    &[("question", question), ("all_improved_responses", improved.as_str())],
                )
            })
            .collect();

        let responses = self.fan_out.call_many(calls, cancel).await?;
        Ok(DebateRound::new(spec.round, spec.round_type.clone(), &spec.name).with_responses(responses))
    }

    async fn final_synthesis(
        &self,
        spec: &RoundSpec,
        question: &str,
        session: &DebateSession,
        cancel: &CancellationToken,
    ) -> Result<RoundOutcome, ConclaveError> {
        let all_debate_data = format_rounds(&session.rounds, self.fan_out.client().registry());
        let rounds = session.rounds.len().to_string();
        let time = session.elapsed().num_seconds().max(0).to_string();
        let tokens = session.computed_total_tokens().to_string();

        let synthesis = self
            .synthesize(
                "round_5_synthesis",
                &[
                    ("question", question),
                    ("all_debate_data", all_debate_data.as_str()),
                    ("rounds", rounds.as_str()),
                    ("time", time.as_str()),
                    ("tokens", tokens.as_str()),
                ],
                cancel,
            )
            .await?;

        Ok(match synthesis {
            Some(response) => RoundOutcome::Recorded(
                DebateRound::new(spec.round, spec.round_type.clone(), &spec.name)
                    .with_responses(vec![response]),
            ),
            None => RoundOutcome::SynthesisFailed,
        })
    }

    fn append_synthesis(&self, round: &mut DebateRound, synthesis: Option<AIResponse>) {
        match synthesis {
            Some(response) => {
                round.summary = Some(format!("synthesis by {}", response.backend_name));
                round.responses.push(response);
            }
            None => {
                warn!(round = round.round_number, synthesizer = %self.synthesizer, "synthesis call failed");
                round.summary = Some("synthesis unavailable".to_string());
            }
        }
    }
}

/// Responses of the most recent round that was not skipped, empty before round one.
fn previous_responses(session: &DebateSession) -> &[AIResponse] {
    session
        .rounds
        .iter()
        .rev()
        .find(|r| !r.skipped)
        .map(|r| r.responses.as_slice())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::backend::{
        BackendClient, ChatCompletion, ChatRequest, CompletionTransport, RetryPolicy,
    };
    use crate::config::ConclaveConfig;
    use crate::error::AttemptError;
    use crate::prompts::PromptTemplates;

    /// Records every request and answers with the model id, failing for listed models.
    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<ChatRequest>>,
        failing: Vec<&'static str>,
    }

    #[async_trait]
    impl CompletionTransport for Recorder {
        async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, AttemptError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.failing.contains(&request.model.as_str()) {
                return Err(AttemptError::Transport("down".into()));
            }
            Ok(ChatCompletion {
                content: format!("reply from {}\nConfidence: 80%", request.model),
                tokens_used: 5,
                model: None,
            })
        }
    }

    impl Recorder {
        fn prompts_for(&self, model: &str) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.model == model)
                .map(|r| r.messages[1].content.clone())
                .collect()
        }
    }

    fn runner(transport: Arc<Recorder>) -> RoundRunner {
        let config = ConclaveConfig::default();
        let client = BackendClient::new(
            transport,
            Arc::new(config.backends.clone()),
            Arc::new(PromptTemplates::with_defaults(&config.prompts)),
            RetryPolicy {
                attempts: 1,
                delay: Duration::ZERO,
            },
        );
        RoundRunner::new(FanOut::new(client), "chatgpt")
    }

    fn keys() -> Vec<String> {
        vec!["gemini".to_string(), "claude".to_string()]
    }

    fn seeded_session() -> DebateSession {
        let mut session = DebateSession::new("u", "Which sort?", "standard");
        session
            .add_round(
                DebateRound::new(1, RoundType::IndependentGeneration, "Answers").with_responses(vec![
                    AIResponse::new("gemini", "Gemini 3 Pro", "GEMINI-ROUND-ONE", Some(70.0), Some(3)),
                    AIResponse::new("claude", "Claude Opus 4.5", "CLAUDE-ROUND-ONE", Some(90.0), Some(4)),
                ]),
            )
            .unwrap();
        session
            .add_round(
                DebateRound::new(2, RoundType::MutualCritique, "Critique").with_responses(vec![
                    AIResponse::new("gemini", "Gemini 3 Pro", "GEMINI-CRITIQUE", None, None),
                    AIResponse::new("claude", "Claude Opus 4.5", "CLAUDE-CRITIQUE", None, None),
                ]),
            )
            .unwrap();
        session
    }

    const GEMINI: &str = "google/gemini-3-pro-preview";
    const CLAUDE: &str = "anthropic/claude-opus-4.5";
    const CHATGPT: &str = "openai/gpt-5.1";

    #[tokio::test]
    async fn test_independent_generation_frames_each_backend() {
        let transport = Arc::new(Recorder::default());
        let runner = runner(transport.clone());
        let session = DebateSession::new("u", "Which sort?", "quick");
        let spec = RoundSpec::new(1, RoundType::IndependentGeneration, "Answers");

        let outcome = runner
            .run(&spec, "Which sort?", &keys(), &session, &CancellationToken::new())
            .await
            .unwrap();

        let RoundOutcome::Recorded(round) = outcome else {
            panic!("expected recorded round");
        };
        assert_eq!(round.round_number, 1);
        assert_eq!(round.responses.len(), 2);
        assert_eq!(round.responses[0].confidence, Some(80.0));

        let prompt = &transport.prompts_for(GEMINI)[0];
        assert!(prompt.contains("Researcher"));
        assert!(prompt.contains("Which sort?"));
        assert!(transport.prompts_for(CLAUDE)[0].contains("Critic"));
    }

    #[tokio::test]
    async fn test_mutual_critique_excludes_self() {
        let transport = Arc::new(Recorder::default());
        let runner = runner(transport.clone());
        let mut session = seeded_session();
        session.rounds.truncate(1);
        let spec = RoundSpec::new(2, RoundType::MutualCritique, "Critique");

        runner
            .run(&spec, "Which sort?", &keys(), &session, &CancellationToken::new())
            .await
            .unwrap();

        let gemini_prompt = &transport.prompts_for(GEMINI)[0];
        assert!(gemini_prompt.contains("CLAUDE-ROUND-ONE"));
        assert!(!gemini_prompt.contains("GEMINI-ROUND-ONE"));
    }

    #[tokio::test]
    async fn test_critique_over_empty_round_does_not_cite_content() {
        let transport = Arc::new(Recorder::default());
        let runner = runner(transport.clone());
        let mut session = DebateSession::new("u", "q", "quick");
        session
            .add_round(DebateRound::new(1, RoundType::IndependentGeneration, "Answers"))
            .unwrap();
        let spec = RoundSpec::new(2, RoundType::MutualCritique, "Critique");

        let outcome = runner
            .run(&spec, "q", &keys(), &session, &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, RoundOutcome::Recorded(ref r) if r.responses.len() == 2));
        assert!(transport.prompts_for(GEMINI)[0].contains(crate::debate::context::NO_RESPONSES));
    }

    #[tokio::test]
    async fn test_critique_and_synthesis_appends_synthesizer() {
        let transport = Arc::new(Recorder::default());
        let runner = runner(transport.clone());
        let mut session = seeded_session();
        session.rounds.truncate(1);
        let spec = RoundSpec::new(2, RoundType::CritiqueAndSynthesis, "Critique + synthesis");

        let outcome = runner
            .run(&spec, "Which sort?", &keys(), &session, &CancellationToken::new())
            .await
            .unwrap();

        let RoundOutcome::Recorded(round) = outcome else {
            panic!("expected recorded round");
        };
        assert_eq!(round.responses.len(), 3);
        assert_eq!(round.responses[2].backend_key, "chatgpt");
        assert_eq!(round.summary.as_deref(), Some("synthesis by ChatGPT 5.1"));

        let synthesis_prompt = &transport.prompts_for(CHATGPT)[0];
        assert!(synthesis_prompt.contains("=== STAGE 1 ==="));
        assert!(synthesis_prompt.contains("=== STAGE 2 ==="));
        assert!(synthesis_prompt.contains("GEMINI-ROUND-ONE"));
    }

    #[tokio::test]
    async fn test_failed_stage_synthesis_keeps_critiques() {
        let transport = Arc::new(Recorder {
            failing: vec![CHATGPT],
            ..Default::default()
        });
        let runner = runner(transport);
        let session = seeded_session();
        let spec = RoundSpec::new(3, RoundType::CritiqueAndSynthesis, "again");

        let outcome = runner
            .run(&spec, "q", &keys(), &session, &CancellationToken::new())
            .await
            .unwrap();

        let RoundOutcome::Recorded(round) = outcome else {
            panic!("expected recorded round");
        };
        assert_eq!(round.responses.len(), 2);
        assert_eq!(round.summary.as_deref(), Some("synthesis unavailable"));
    }

    #[tokio::test]
    async fn test_improvement_uses_own_answer_and_others_critique() {
        let transport = Arc::new(Recorder::default());
        let runner = runner(transport.clone());
        let session = seeded_session();
        let spec = RoundSpec::new(3, RoundType::Improvement, "Improvement");

        runner
            .run(&spec, "Which sort?", &keys(), &session, &CancellationToken::new())
            .await
            .unwrap();

        let prompt = &transport.prompts_for(GEMINI)[0];
        assert!(prompt.contains("GEMINI-ROUND-ONE"));
        assert!(!prompt.contains("CLAUDE-ROUND-ONE"));
        assert!(prompt.contains("CLAUDE-CRITIQUE"));
        assert!(!prompt.contains("GEMINI-CRITIQUE"));
    }

    #[tokio::test]
    async fn test_improvement_without_initial_answer_still_runs() {
        let transport = Arc::new(Recorder::default());
        let runner = runner(transport.clone());
        let session = seeded_session();
        let spec = RoundSpec::new(3, RoundType::Improvement, "Improvement");
        let keys = vec!["grok".to_string(), "gemini".to_string()];

        let outcome = runner
            .run(&spec, "Which sort?", &keys, &session, &CancellationToken::new())
            .await
            .unwrap();

        let RoundOutcome::Recorded(round) = outcome else {
            panic!("expected recorded round");
        };
        assert_eq!(round.responses.len(), 2);
        assert_eq!(round.responses[0].backend_key, "grok");

        let prompt = &transport.prompts_for("x-ai/grok-4.1-fast")[0];
        assert!(prompt.contains(NO_PREVIOUS_ANSWER));
        assert!(prompt.contains("GEMINI-CRITIQUE"));
        assert!(prompt.contains("CLAUDE-CRITIQUE"));
    }

    #[tokio::test]
    async fn test_improvement_and_synthesis_without_synthesizer() {
        let transport = Arc::new(Recorder {
            failing: vec![CHATGPT],
            ..Default::default()
        });
        let runner = runner(transport.clone());
        let session = seeded_session();
        let spec = RoundSpec::new(3, RoundType::ImprovementAndSynthesis, "Improve");

        let outcome = runner
            .run(&spec, "q", &keys(), &session, &CancellationToken::new())
            .await
            .unwrap();

        let RoundOutcome::Recorded(round) = outcome else {
            panic!("expected recorded round");
        };
        assert_eq!(round.responses.len(), 2);
        assert!(round.response_from("chatgpt").is_none());
        assert_eq!(round.summary.as_deref(), Some("synthesis unavailable"));
        assert_eq!(transport.prompts_for(CHATGPT).len(), 1);
    }

    #[tokio::test]
    async fn test_improvement_and_synthesis_folds_all_rounds() {
        let transport = Arc::new(Recorder::default());
        let runner = runner(transport.clone());
        let session = seeded_session();
        let spec = RoundSpec::new(3, RoundType::ImprovementAndSynthesis, "Improve");

        let outcome = runner
            .run(&spec, "q", &keys(), &session, &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, RoundOutcome::Recorded(ref r) if r.responses.len() == 3));
        let prompt = &transport.prompts_for(CHATGPT)[0];
        assert!(prompt.contains("=== ROUND 1 ==="));
        assert!(prompt.contains("=== ROUND 3 ==="));
        assert!(prompt.contains(&format!("reply from {GEMINI}")));
    }

    #[tokio::test]
    async fn test_consensus_includes_own_response() {
        let transport = Arc::new(Recorder::default());
        let runner = runner(transport.clone());
        let session = seeded_session();
        let spec = RoundSpec::new(3, RoundType::ConsensusBuilding, "Consensus");

        runner
            .run(&spec, "q", &keys(), &session, &CancellationToken::new())
            .await
            .unwrap();

        let prompt = &transport.prompts_for(GEMINI)[0];
        assert!(prompt.contains("GEMINI-CRITIQUE"));
        assert!(prompt.contains("CLAUDE-CRITIQUE"));
    }

    #[tokio::test]
    async fn test_final_synthesis_single_call_with_counters() {
        let transport = Arc::new(Recorder::default());
        let runner = runner(transport.clone());
        let session = seeded_session();
        let spec = RoundSpec::new(3, RoundType::FinalSynthesis, "Final");

        let outcome = runner
            .run(&spec, "q", &keys(), &session, &CancellationToken::new())
            .await
            .unwrap();

        let RoundOutcome::Recorded(round) = outcome else {
            panic!("expected recorded round");
        };
        assert_eq!(round.responses.len(), 1);
        assert_eq!(round.responses[0].backend_key, "chatgpt");
        assert!(transport.prompts_for(GEMINI).is_empty());

        let prompt = &transport.prompts_for(CHATGPT)[0];
        assert!(prompt.contains("2 rounds"));
        assert!(prompt.contains("7 tokens"));
    }

    #[tokio::test]
    async fn test_final_synthesis_failure() {
        let transport = Arc::new(Recorder {
            failing: vec![CHATGPT],
            ..Default::default()
        });
        let runner = runner(transport);
        let session = seeded_session();
        let spec = RoundSpec::new(3, RoundType::FinalSynthesis, "Final");

        let outcome = runner
            .run(&spec, "q", &keys(), &session, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, RoundOutcome::SynthesisFailed);
    }

    #[tokio::test]
    async fn test_unknown_round_type_is_skipped() {
        let transport = Arc::new(Recorder::default());
        let runner = runner(transport.clone());
        let session = DebateSession::new("u", "q", "custom");
        let spec = RoundSpec::new(1, RoundType::Unrecognized("brainstorm".into()), "Mystery");

        let outcome = runner
            .run(&spec, "q", &keys(), &session, &CancellationToken::new())
            .await
            .unwrap();

        let RoundOutcome::Skipped(round) = outcome else {
            panic!("expected skipped round");
        };
        assert!(round.skipped);
        assert_eq!(round.round_number, 1);
        assert!(round.responses.is_empty());
        assert!(round.summary.unwrap().contains("brainstorm"));
        assert!(transport.requests.lock().unwrap().is_empty());
    }
}
