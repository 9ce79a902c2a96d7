//! Final-answer selection policy.
//!
//! Order of preference:
//! 1. The sole response of a recorded `final_synthesis` round.
//! 2. A fallback synthesis over the whole history.
//! 3. The highest-confidence response of the latest round that has any.
//! 4. A fixed "no answer" text when the session holds no responses at all.
//!
//! The default confidences are policy constants, not derived values.

use serde::{Deserialize, Serialize};

use super::state::{AIResponse, DebateRound, DebateSession};

/// Applied when a synthesis reply carries no confidence.
pub const SYNTHESIS_CONFIDENCE: f64 = 85.0;
/// Applied when the best-response fallback carries no confidence.
pub const FALLBACK_CONFIDENCE: f64 = 80.0;

pub const NO_ANSWER: &str =
    "No backend produced an answer to this question. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    FinalSynthesisRound,
    FallbackSynthesis,
    BestResponse { backend_key: String },
    NoAnswer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinalAnswer {
    pub content: String,
    pub confidence: f64,
    pub source: AnswerSource,
}

impl FinalAnswer {
    /// Answer taken from a recorded `final_synthesis` round.
    pub fn from_final_round(round: &DebateRound) -> Option<Self> {
        round.responses.first().map(|r| Self {
            content: r.content.clone(),
            confidence: r.confidence.unwrap_or(SYNTHESIS_CONFIDENCE),
            source: AnswerSource::FinalSynthesisRound,
        })
    }

    /// Answer taken from the fallback synthesizer call.
    pub fn from_synthesis(response: &AIResponse) -> Self {
        Self {
            content: response.content.clone(),
            confidence: response.confidence.unwrap_or(SYNTHESIS_CONFIDENCE),
            source: AnswerSource::FallbackSynthesis,
        }
    }

    /// Best available response, or the fixed no-answer text.
    pub fn from_best_available(session: &DebateSession) -> Self {
        match best_available(session) {
            Some(r) => Self {
                content: r.content.clone(),
                confidence: r.confidence.unwrap_or(FALLBACK_CONFIDENCE),
                source: AnswerSource::BestResponse {
                    backend_key: r.backend_key.clone(),
                },
            },
            None => Self {
                content: NO_ANSWER.to_string(),
                confidence: 0.0,
                source: AnswerSource::NoAnswer,
            },
        }
    }
}

/// Highest confidence wins; ties go to the earliest response. Missing confidence counts as 0.
pub fn best_response(responses: &[AIResponse]) -> Option<&AIResponse> {
    let mut best: Option<&AIResponse> = None;
    for response in responses {
        let score = response.confidence.unwrap_or(0.0);
        match best {
            Some(current) if score <= current.confidence.unwrap_or(0.0) => {}
            _ => best = Some(response),
        }
    }
    best
}

/// Best response of the latest round that has any responses.
pub fn best_available(session: &DebateSession) -> Option<&AIResponse> {
    session
        .rounds
        .iter()
        .rev()
        .find(|r| !r.is_empty())
        .and_then(|r| best_response(&r.responses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoundType;

    fn resp(key: &str, confidence: Option<f64>) -> AIResponse {
        AIResponse::new(key, key, &format!("answer from {key}"), confidence, None)
    }

    #[test]
    fn test_best_response_highest_confidence() {
        let responses = vec![resp("a", Some(60.0)), resp("b", Some(90.0)), resp("c", None)];
        assert_eq!(best_response(&responses).unwrap().backend_key, "b");
    }

    #[test]
    fn test_best_response_tie_goes_to_first() {
        let responses = vec![resp("a", Some(70.0)), resp("b", Some(90.0)), resp("c", Some(90.0))];
        assert_eq!(best_response(&responses).unwrap().backend_key, "b");
    }

    #[test]
    fn test_best_response_all_missing_picks_first() {
        let responses = vec![resp("a", None), resp("b", None)];
        assert_eq!(best_response(&responses).unwrap().backend_key, "a");
        assert!(best_response(&[]).is_none());
    }

    #[test]
    fn test_from_final_round_defaults_to_85() {
        let round = DebateRound::new(5, RoundType::FinalSynthesis, "Final")
            .with_responses(vec![resp("chatgpt", None)]);
        let answer = FinalAnswer::from_final_round(&round).unwrap();
        assert_eq!(answer.confidence, SYNTHESIS_CONFIDENCE);
        assert_eq!(answer.source, AnswerSource::FinalSynthesisRound);

        let empty = DebateRound::new(5, RoundType::FinalSynthesis, "Final");
        assert!(FinalAnswer::from_final_round(&empty).is_none());
    }

    #[test]
    fn test_best_available_defaults_to_80_and_skips_empty_rounds() {
        let mut session = DebateSession::new("u", "q", "quick");
        session
            .add_round(
                DebateRound::new(1, RoundType::IndependentGeneration, "a")
                    .with_responses(vec![resp("x", None), resp("y", None)]),
            )
            .unwrap();
        session
            .add_round(DebateRound::new(2, RoundType::MutualCritique, "b"))
            .unwrap();

        let answer = FinalAnswer::from_best_available(&session);
        assert_eq!(answer.content, "answer from x");
        assert_eq!(answer.confidence, FALLBACK_CONFIDENCE);
        assert_eq!(
            answer.source,
            AnswerSource::BestResponse {
                backend_key: "x".to_string()
            }
        );
    }

    #[test]
    fn test_no_responses_anywhere() {
        let mut session = DebateSession::new("u", "q", "quick");
        session
            .add_round(DebateRound::new(1, RoundType::IndependentGeneration, "a"))
            .unwrap();
        let answer = FinalAnswer::from_best_available(&session);
        assert_eq!(answer.content, NO_ANSWER);
        assert_eq!(answer.confidence, 0.0);
        assert_eq!(answer.source, AnswerSource::NoAnswer);
    }
}
