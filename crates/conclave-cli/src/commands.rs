//! Sub-command bodies. Each one owns the components it needs.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use conclave::debate::report;
use conclave::{ConclaveConfig, DebateOrchestrator, HttpTransport, SessionStore};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Preview length of each response in the debate report.
const REPORT_PREVIEW_CHARS: usize = 300;

fn require_api_key(config: &ConclaveConfig) -> Result<()> {
    if config.api.api_key.trim().is_empty() {
        bail!(
            "no API key configured: set {} or {}",
            conclave::config::ENV_API_KEY,
            conclave::config::ENV_FALLBACK_API_KEY
        );
    }
    Ok(())
}

fn transport(config: &ConclaveConfig) -> Result<HttpTransport> {
    require_api_key(config)?;
    HttpTransport::new(&config.api).context("building HTTP transport")
}

pub async fn debate(
    config: &ConclaveConfig,
    question: &str,
    mode: &str,
    backends: Option<Vec<String>>,
    user: &str,
    json: bool,
) -> Result<()> {
    let orchestrator = DebateOrchestrator::from_config(config, Arc::new(transport(config)?));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling debate");
            trigger.cancel();
        }
    });

    let session = orchestrator
        .run_with_cancel(user, question, mode, backends.as_deref(), &cancel)
        .await
        .context("debate failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!(
            "{}",
            report::format_session(&session, &config.backends, REPORT_PREVIEW_CHARS)
        );
    }
    Ok(())
}

pub async fn ask(config: &ConclaveConfig, backend: &str, question: &str) -> Result<()> {
    let orchestrator = DebateOrchestrator::from_config(config, Arc::new(transport(config)?));
    let response = orchestrator
        .client()
        .ask(backend, question)
        .await
        .with_context(|| format!("asking {backend}"))?;
    println!("{}", report::format_single(&response, &config.backends));
    Ok(())
}

pub fn history(config: &ConclaveConfig, user: &str, limit: usize) -> Result<()> {
    let store = SessionStore::new(config.storage.sessions_dir.clone());
    let sessions = store
        .history(user, limit)
        .with_context(|| format!("reading history from {}", store.dir().display()))?;

    if sessions.is_empty() {
        println!("No saved debates for user '{user}'.");
        return Ok(());
    }
    for session in &sessions {
        println!("{}", report::history_line(session));
    }
    Ok(())
}

pub async fn models(config: &ConclaveConfig, search: Option<&str>) -> Result<()> {
    let transport = transport(config)?;
    let models = transport
        .list_models(search)
        .await
        .with_context(|| format!("listing models from {}", transport.base_url()))?;

    println!("Found {} models", models.len());
    for model in &models {
        println!("{:<50} {}", model.id, model.name);
    }
    Ok(())
}

pub fn modes(config: &ConclaveConfig) {
    println!("Modes (default: {}):", config.debate.default_mode);
    for mode in config.modes.iter() {
        println!("  {:<10} {} - {}", mode.key, mode.name, mode.description);
        for round in &mode.rounds {
            let note = if round.round_type.is_recognized() {
                ""
            } else {
                " (unknown type, skipped)"
            };
            println!("      {}. {} [{}]{}", round.round, round.name, round.round_type, note);
        }
    }

    println!("\nBackends (synthesizer: {}):", config.debate.synthesizer);
    for backend in config.backends.iter() {
        println!(
            "  {} {:<10} {:<20} {} ({})",
            backend.color, backend.key, backend.name, backend.role, backend.id
        );
    }
}
