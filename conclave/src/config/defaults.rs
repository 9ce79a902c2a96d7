//! Built-in configuration used when no file is supplied.

use std::collections::HashMap;

use super::{BackendProfile, DebateModeDefinition, RoundSpec, RoundType};

fn profile(
    key: &str,
    name: &str,
    id: &str,
    role: &str,
    specialization: &[&str],
    color: &str,
) -> BackendProfile {
    BackendProfile {
        key: key.to_string(),
        name: name.to_string(),
        id: id.to_string(),
        role: role.to_string(),
        specialization: specialization.iter().map(|s| s.to_string()).collect(),
        color: color.to_string(),
        temperature: 0.2,
        max_tokens: 8192,
        reasoning: None,
        verbosity: None,
        description: None,
    }
}

pub(super) fn backends() -> Vec<BackendProfile> {
    let mut chatgpt = profile(
        "chatgpt",
        "ChatGPT 5.1",
        "openai/gpt-5.1",
        "Synthesizer",
        &["synthesis", "structured reasoning", "final judgement"],
        "🟠",
    );
    chatgpt.reasoning = Some("high".to_string());
    chatgpt.verbosity = Some("medium".to_string());

    vec![
        profile(
            "gemini",
            "Gemini 3 Pro",
            "google/gemini-3-pro-preview",
            "Researcher",
            &["facts", "broad knowledge", "sources"],
            "🔵",
        ),
        profile(
            "claude",
            "Claude Opus 4.5",
            "anthropic/claude-opus-4.5",
            "Critic",
            &["logic", "edge cases", "ethics"],
            "🟣",
        ),
        profile(
            "grok",
            "Grok 4.1",
            "x-ai/grok-4.1-fast",
            "Contrarian",
            &["alternative views", "practicality"],
            "🟢",
        ),
        chatgpt,
    ]
}

pub(super) fn modes() -> Vec<DebateModeDefinition> {
    use RoundType::*;

    vec![
        DebateModeDefinition {
            key: "quick".to_string(),
            name: "Quick".to_string(),
            description: "Independent answers, then critique with synthesis".to_string(),
            rounds: vec![
                RoundSpec::new(1, IndependentGeneration, "Independent answers"),
                RoundSpec::new(2, CritiqueAndSynthesis, "Critique and synthesis"),
            ],
        },
        DebateModeDefinition {
            key: "standard".to_string(),
            name: "Standard".to_string(),
            description: "Answers, mutual critique, improvement with synthesis".to_string(),
            rounds: vec![
                RoundSpec::new(1, IndependentGeneration, "Independent answers"),
                RoundSpec::new(2, MutualCritique, "Mutual critique"),
                RoundSpec::new(3, ImprovementAndSynthesis, "Improvement and synthesis"),
            ],
        },
        DebateModeDefinition {
            key: "deep".to_string(),
            name: "Deep".to_string(),
            description: "Full five-round debate ending in a dedicated synthesis".to_string(),
            rounds: vec![
                RoundSpec::new(1, IndependentGeneration, "Independent answers"),
                RoundSpec::new(2, MutualCritique, "Mutual critique"),
                RoundSpec::new(3, Improvement, "Improvement"),
                RoundSpec::new(4, ConsensusBuilding, "Consensus building"),
                RoundSpec::new(5, FinalSynthesis, "Final synthesis"),
            ],
        },
    ]
}

const SYSTEM_BASE: &str = "You are one participant in a structured debate between several AI models. \
Argue from evidence, name your assumptions, and change your position when another participant \
makes a better argument. End every reply with a line of the form \"Confidence: NN%\".";

const ROUND_1_INDEPENDENT: &str = "Your role: {role}. Your specialization: {specialization}.

Answer the question below independently. Be concrete and complete.

Question: {question}";

const ROUND_2_CRITIQUE: &str = "Your role: {role}. Your specialization: {specialization}.

Other participants answered the question as follows:

{other_responses}

Critique these answers. Point out factual errors, gaps and weak reasoning, and say what you agree with.";

const ROUND_3_IMPROVEMENT: &str = "Your role: {role}. Your specialization: {specialization}.

Your previous answer:
{your_previous_response}

Critique you received from the other participants:
{critique_received}

Write an improved answer that addresses the valid points of criticism.";

const ROUND_4_CONSENSUS: &str = "Your role: {role}. Your specialization: {specialization}.

Improved answers from all participants:

{all_improved_responses}

Propose a consensus position. State where the participants agree and how the remaining disagreements should be resolved.";

const ROUND_5_SYNTHESIS: &str = "Produce the final answer of the debate.

Complete debate record ({rounds} rounds, {time} s, {tokens} tokens):

{all_debate_data}

Write one definitive, well-structured answer that combines the strongest arguments.";

const STAGE_SYNTHESIS: &str = "Analyze all answers and critiques and synthesize the final answer.

DEBATE DATA:
{debate_data}

Question: {question}";

const HISTORY_SYNTHESIS: &str = "Analyze the full debate history including the improved answers and synthesize the final answer.

FULL DEBATE HISTORY:
{all_debate_data}

Question: {question}";

const FALLBACK_SYNTHESIS: &str = "Question: {question}

All answers from the debate:
{all_debate_data}

Synthesize the final answer.";

const SINGLE_ASK: &str = "Your role: {role}. Your specialization: {specialization}.

Question: {question}";

pub(super) fn prompts() -> HashMap<String, String> {
    [
        ("system_base", SYSTEM_BASE),
        ("round_1_independent", ROUND_1_INDEPENDENT),
        ("round_2_critique", ROUND_2_CRITIQUE),
        ("round_3_improvement", ROUND_3_IMPROVEMENT),
        ("round_4_consensus", ROUND_4_CONSENSUS),
        ("round_5_synthesis", ROUND_5_SYNTHESIS),
        ("stage_synthesis", STAGE_SYNTHESIS),
        ("history_synthesis", HISTORY_SYNTHESIS),
        ("fallback_synthesis", FALLBACK_SYNTHESIS),
        ("single_ask", SINGLE_ASK),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
