//! Conclave debate engine
//!
//! Negotiates one answer to a question from several independent, unreliable
//! remote text-generation backends.
//!
//! # Layers
//!
//! - `config`: typed configuration, backend and mode registries
//! - `prompts`: keyed prompt templates with `{name}` substitution
//! - `backend`: transport seam, retrying client, confidence scraping, fan-out
//! - `debate`: round state machine, orchestrator, session model, storage, reports
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use conclave::{ConclaveConfig, DebateOrchestrator, HttpTransport};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConclaveConfig::load_or_default("conclave.yaml".as_ref())?;
//! let transport = Arc::new(HttpTransport::new(&config.api)?);
//! let orchestrator = DebateOrchestrator::from_config(&config, transport);
//! let session = orchestrator.run("42", "Is Pluto a planet?", "quick", None).await?;
//! println!("{}", session.final_answer.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod backend;
pub mod config;
pub mod debate;
pub mod error;
pub mod prompts;

#[cfg(test)]
mod test_support;

pub use backend::{BackendClient, CompletionTransport, FanOut, HttpTransport, RetryPolicy};
pub use config::{
    BackendProfile, BackendRegistry, ConclaveConfig, DebateModeDefinition, ModeRegistry,
    RoundSpec, RoundType,
};
pub use debate::{AIResponse, DebateOrchestrator, DebateRound, DebateSession, SessionStore};
pub use error::{
    AttemptError, BackendError, ConclaveError, ConclaveResult, ConfigError, SessionError,
    StorageError,
};
pub use prompts::PromptTemplates;
