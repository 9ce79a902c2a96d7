//! Rendering prior responses into prompt context.

use crate::config::BackendRegistry;

use super::state::{AIResponse, DebateRound};

/// Stands in for an empty response group so prompts never cite absent content.
pub const NO_RESPONSES: &str = "(no responses were received in this stage)";

fn format_confidence(confidence: Option<f64>) -> String {
    match confidence {
        Some(c) if c.fract() == 0.0 => format!("{c:.0}%"),
        Some(c) => format!("{c:.1}%"),
        None => "n/a".to_string(),
    }
}

/// One labeled block per response, separated by blank lines.
pub fn format_responses(responses: &[AIResponse], registry: &BackendRegistry) -> String {
    if responses.is_empty() {
        return NO_RESPONSES.to_string();
    }

    responses
        .iter()
        .map(|r| {
            format!(
                "{} **{}** ({}):\n{}\nConfidence: {}",
                registry.color_of(&r.backend_key),
                r.backend_name,
                registry.role_of(&r.backend_key),
                r.content.trim_end(),
                format_confidence(r.confidence)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Several response groups under `=== STAGE i ===` headers.
pub fn format_stages(stages: &[&[AIResponse]], registry: &BackendRegistry) -> String {
    stages
        .iter()
        .enumerate()
        .map(|(i, group)| format!("=== STAGE {} ===\n{}", i + 1, format_responses(group, registry)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Every round under `=== ROUND n ===` headers.
pub fn format_rounds(rounds: &[DebateRound], registry: &BackendRegistry) -> String {
    if rounds.is_empty() {
        return NO_RESPONSES.to_string();
    }

    rounds
        .iter()
        .map(|round| {
            format!(
                "=== ROUND {} ===\n{}",
                round.round_number,
                format_responses(&round.responses, registry)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConclaveConfig, RoundType};

    fn registry() -> BackendRegistry {
        ConclaveConfig::default().backends
    }

    #[test]
    fn test_format_responses_labels() {
        let responses = vec![
            AIResponse::new("claude", "Claude Opus 4.5", "Answer A\n", Some(85.0), None),
            AIResponse::new("grok", "Grok 4.1", "Answer B", None, None),
        ];
        let text = format_responses(&responses, &registry());

        assert!(text.starts_with("🟣 **Claude Opus 4.5** (Critic):\nAnswer A\nConfidence: 85%"));
        assert!(text.contains("\n\n🟢 **Grok 4.1** (Contrarian):\nAnswer B\nConfidence: n/a"));
    }

    #[test]
    fn test_unknown_backend_falls_back_to_defaults() {
        let responses = vec![AIResponse::new("ghost", "Ghost", "boo", Some(12.5), None)];
        let text = format_responses(&responses, &registry());
        assert_eq!(text, "⚪ **Ghost** (Unknown):\nboo\nConfidence: 12.5%");
    }

    #[test]
    fn test_empty_group_renders_marker() {
        assert_eq!(format_responses(&[], &registry()), NO_RESPONSES);
    }

    #[test]
    fn test_format_stages_headers() {
        let first = vec![AIResponse::new("gemini", "Gemini 3 Pro", "one", None, None)];
        let text = format_stages(&[first.as_slice(), &[]], &registry());
        assert!(text.starts_with("=== STAGE 1 ===\n🔵 **Gemini 3 Pro**"));
        assert!(text.contains(&format!("=== STAGE 2 ===\n{NO_RESPONSES}")));
    }

    #[test]
    fn test_format_rounds_headers() {
        let rounds = vec![
            DebateRound::new(1, RoundType::IndependentGeneration, "a").with_responses(vec![
                AIResponse::new("gemini", "Gemini 3 Pro", "one", None, None),
            ]),
            DebateRound::new(2, RoundType::MutualCritique, "b"),
        ];
        let text = format_rounds(&rounds, &registry());
        assert!(text.contains("=== ROUND 1 ==="));
        assert!(text.contains(&format!("=== ROUND 2 ===\n{NO_RESPONSES}")));
    }
}
