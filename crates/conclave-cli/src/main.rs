mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use conclave::ConclaveConfig;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Ask several AI backends and let them debate one answer", long_about = None)]
struct Cli {
    /// Configuration file (YAML or TOML). Built-in defaults are used when it does not exist.
    #[arg(long, global = true, env = "CONCLAVE_CONFIG", default_value = "conclave.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a multi-round debate and print the final answer
    Debate {
        question: String,
        /// Debate mode (see `conclave modes`)
        #[arg(long, short)]
        mode: Option<String>,
        /// Restrict the debate to these backends (repeatable)
        #[arg(long = "backend", short)]
        backends: Vec<String>,
        /// User id recorded in the saved session
        #[arg(long, default_value = "local")]
        user: String,
        /// Print the full session as JSON instead of the report
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Ask a single backend
    Ask { backend: String, question: String },
    /// List saved debates, newest first
    History {
        #[arg(long, default_value = "local")]
        user: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// List models offered by the gateway
    Models {
        /// Case-insensitive filter on id or name
        #[arg(long)]
        search: Option<String>,
    },
    /// Show configured debate modes and backends
    Modes,
}

/// Filter used until the configuration is known.
const STARTUP_LOG_LEVEL: &str = "info";

/// Directive to apply once the configuration is loaded, or `None` when `RUST_LOG` already decided.
fn configured_directive(rust_log_set: bool, configured: &str) -> Option<String> {
    let configured = configured.trim();
    (!rust_log_set && !configured.is_empty()).then(|| configured.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env().ok();
    let rust_log_set = env_filter.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new(STARTUP_LOG_LEVEL)));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let config_exists = cli.config.exists();
    let config = ConclaveConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    if let Some(directive) = configured_directive(rust_log_set, &config.logging.level) {
        filter_handle
            .reload(EnvFilter::new(directive))
            .context("applying configured log level")?;
    }

    if !config_exists {
        warn!(path = %cli.config.display(), "config file not found, using built-in defaults");
    }
    info!(
        backends = config.backends.len(),
        modes = config.modes.len(),
        synthesizer = %config.debate.synthesizer,
        "conclave starting"
    );

    match cli.command {
        Command::Debate {
            question,
            mode,
            backends,
            user,
            json,
        } => {
            let mode = mode.unwrap_or_else(|| config.debate.default_mode.clone());
            let backends = (!backends.is_empty()).then_some(backends);
            commands::debate(&config, &question, &mode, backends, &user, json).await
        }
        Command::Ask { backend, question } => commands::ask(&config, &backend, &question).await,
        Command::History { user, limit } => commands::history(&config, &user, limit),
        Command::Models { search } => commands::models(&config, search.as_deref()).await,
        Command::Modes => {
            commands::modes(&config);
            Ok(())
        }
    }
}
