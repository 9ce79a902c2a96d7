//! User-facing text for completed sessions and single answers.

use std::fmt::Write;

use crate::config::BackendRegistry;

use super::state::{AIResponse, DebateSession};

const RULE: &str = "==================================================";

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn preview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

fn confidence_label(confidence: Option<f64>) -> String {
    match confidence {
        Some(c) => format!("{c:.0}%"),
        None => "n/a".to_string(),
    }
}

/// Full session report: header, final answer, then per-round previews.
pub fn format_session(
    session: &DebateSession,
    registry: &BackendRegistry,
    preview_chars: usize,
) -> String {
    let mut out = String::new();
    let elapsed = session.elapsed().num_milliseconds() as f64 / 1000.0;

    let _ = writeln!(out, "🎯 Question: {}", session.question);
    let _ = writeln!(
        out,
        "📊 Mode: {} ({} rounds)",
        session.mode,
        session.rounds.len()
    );
    let _ = writeln!(out, "⏱ Time: {elapsed:.1} s");
    let _ = writeln!(out, "🔢 Tokens used: {}", session.total_tokens);
    let _ = writeln!(out, "\n{RULE}\n");

    let _ = writeln!(
        out,
        "✅ FINAL ANSWER (confidence: {})\n",
        confidence_label(session.final_confidence)
    );
    let _ = writeln!(out, "{}", session.final_answer.as_deref().unwrap_or("(pending)"));
    let _ = writeln!(out, "\n{RULE}\n");

    let _ = writeln!(out, "📝 DEBATE DETAILS\n");
    for round in &session.rounds {
        let _ = writeln!(out, "Round {}: {}", round.round_number, round.name);
        if let Some(summary) = &round.summary {
            let _ = writeln!(out, "  ({summary})");
        }
        if round.responses.is_empty() {
            let _ = writeln!(out, "  no responses\n");
            continue;
        }
        out.push('\n');
        for response in &round.responses {
            let conf = response
                .confidence
                .map(|c| format!(" ({c:.0}%)"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "{} {}{}:\n{}\n",
                registry.color_of(&response.backend_key),
                response.backend_name,
                conf,
                preview(&response.content, preview_chars)
            );
        }
    }

    out
}

/// One backend's answer outside of a debate.
pub fn format_single(response: &AIResponse, registry: &BackendRegistry) -> String {
    let mut out = format!(
        "{} {} ({})\n\n{}\n",
        registry.color_of(&response.backend_key),
        response.backend_name,
        registry.role_of(&response.backend_key),
        response.content.trim()
    );
    let _ = write!(
        out,
        "\nConfidence: {} | tokens: {}",
        confidence_label(response.confidence),
        response.tokens()
    );
    out
}

/// One-line summary for history listings.
pub fn history_line(session: &DebateSession) -> String {
    format!(
        "{} [{}] {} | {} | {} tokens | {}",
        session.started_at.format("%Y-%m-%d %H:%M"),
        session.mode,
        session.session_id,
        confidence_label(session.final_confidence),
        session.total_tokens,
        preview(&session.question, 60)
    )
}
