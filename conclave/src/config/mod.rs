//! Typed configuration: backend registry, debate modes, API and storage settings.
//!
//! Everything here is read-only once loaded. The orchestrator receives the
//! registries behind `Arc` and never mutates them.

mod defaults;
mod loader;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

pub use loader::{ENV_API_KEY, ENV_BASE_URL, ENV_FALLBACK_API_KEY, ENV_SESSIONS_DIR};

/// Compiled-in prompt templates, keyed by template name.
pub fn default_prompts() -> HashMap<String, String> {
    defaults::prompts()
}

/// Remote endpoint and retry policy.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the chat-completion API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Bearer token. Normally injected from the environment.
    #[serde(skip_serializing)]
    pub api_key: String,
    /// End-to-end timeout for one attempt, in seconds.
    pub timeout_secs: u64,
    /// Total attempts per call (first try included).
    pub retry_attempts: u32,
    /// Fixed pause between attempts, in seconds.
    pub retry_delay_secs: u64,
    /// Optional `HTTP-Referer` attribution header.
    pub referer: Option<String>,
    /// Optional `X-Title` attribution header.
    pub title: Option<String>,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: String::new(),
            timeout_secs: 60,
            retry_attempts: 3,
            retry_delay_secs: 2,
            referer: None,
            title: Some("Conclave".to_string()),
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("timeout_secs", &self.timeout_secs)
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory receiving one JSON file per completed session.
    pub sessions_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sessions_dir: PathBuf::from("data/debates"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateSettings {
    /// Backend key that performs every synthesis call.
    pub synthesizer: String,
    /// Mode used when a requested mode is unknown.
    pub default_mode: String,
}

impl Default for DebateSettings {
    fn default() -> Self {
        Self {
            synthesizer: "chatgpt".to_string(),
            default_mode: "standard".to_string(),
        }
    }
}

// ── Backends ────────────────────────────────────────────────────────────────

/// Identity, framing and generation defaults of one remote backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendProfile {
    /// Stable key used in modes, requests and persisted sessions.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Remote model identifier sent in the request body.
    pub id: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub specialization: Vec<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Reasoning-effort hint, sent only when present.
    #[serde(default)]
    pub reasoning: Option<String>,
    /// Verbosity hint, sent only when present.
    #[serde(default)]
    pub verbosity: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_role() -> String {
    "Analyst".to_string()
}

fn default_color() -> String {
    "⚪".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    8192
}

impl BackendProfile {
    /// Specialization list as prompt text.
    pub fn specialization_text(&self) -> String {
        self.specialization.join(", ")
    }
}

/// Ordered, read-only lookup of backend profiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendRegistry {
    backends: Vec<BackendProfile>,
}

impl BackendRegistry {
    pub fn new(backends: Vec<BackendProfile>) -> Self {
        Self { backends }
    }

    pub fn lookup(&self, key: &str) -> Result<&BackendProfile, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::BackendNotFound(key.to_string()))
    }

    pub fn get(&self, key: &str) -> Option<&BackendProfile> {
        self.backends.iter().find(|b| b.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// All keys in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.key.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendProfile> {
        self.backends.iter()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Role label for a backend, `"Unknown"` when the key is not configured.
    pub fn role_of(&self, key: &str) -> &str {
        self.get(key).map(|b| b.role.as_str()).unwrap_or("Unknown")
    }

    /// Color tag for a backend, `"⚪"` when the key is not configured.
    pub fn color_of(&self, key: &str) -> &str {
        self.get(key).map(|b| b.color.as_str()).unwrap_or("⚪")
    }
}

// ── Debate modes ────────────────────────────────────────────────────────────

/// Kind of a debate round.
///
/// Strings that do not name a known kind are kept as `Unrecognized` so the
/// orchestrator can record the round as skipped instead of failing the load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoundType {
    IndependentGeneration,
    MutualCritique,
    CritiqueAndSynthesis,
    Improvement,
    ImprovementAndSynthesis,
    ConsensusBuilding,
    FinalSynthesis,
    Unrecognized(String),
}

impl RoundType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::IndependentGeneration => "independent_generation",
            Self::MutualCritique => "mutual_critique",
            Self::CritiqueAndSynthesis => "critique_and_synthesis",
            Self::Improvement => "improvement",
            Self::ImprovementAndSynthesis => "improvement_and_synthesis",
            Self::ConsensusBuilding => "consensus_building",
            Self::FinalSynthesis => "final_synthesis",
            Self::Unrecognized(name) => name,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for RoundType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "independent_generation" => Self::IndependentGeneration,
            "mutual_critique" => Self::MutualCritique,
            "critique_and_synthesis" => Self::CritiqueAndSynthesis,
            "improvement" => Self::Improvement,
            "improvement_and_synthesis" => Self::ImprovementAndSynthesis,
            "consensus_building" => Self::ConsensusBuilding,
            "final_synthesis" => Self::FinalSynthesis,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<RoundType> for String {
    fn from(value: RoundType) -> Self {
        match value {
            RoundType::Unrecognized(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for RoundType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a mode's round structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSpec {
    pub round: u32,
    #[serde(rename = "type")]
    pub round_type: RoundType,
    pub name: String,
}

impl RoundSpec {
    pub fn new(round: u32, round_type: RoundType, name: &str) -> Self {
        Self {
            round,
            round_type,
            name: name.to_string(),
        }
    }
}

/// A named, ordered round structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateModeDefinition {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rounds: Vec<RoundSpec>,
}

impl DebateModeDefinition {
    /// Rounds whose type the engine does not know how to run.
    pub fn unrecognized_rounds(&self) -> impl Iterator<Item = &RoundSpec> {
        self.rounds.iter().filter(|r| !r.round_type.is_recognized())
    }

    /// Whether the last declared round is a `final_synthesis`.
    pub fn ends_with_final_synthesis(&self) -> bool {
        self.rounds
            .last()
            .is_some_and(|r| r.round_type == RoundType::FinalSynthesis)
    }
}

/// Read-only lookup of debate modes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeRegistry {
    modes: Vec<DebateModeDefinition>,
}

impl ModeRegistry {
    pub fn new(modes: Vec<DebateModeDefinition>) -> Self {
        Self { modes }
    }

    pub fn lookup(&self, key: &str) -> Result<&DebateModeDefinition, ConfigError> {
        self.modes
            .iter()
            .find(|m| m.key == key)
            .ok_or_else(|| ConfigError::ModeNotFound(key.to_string()))
    }

    /// Look up `key`, falling back to `fallback` when it is unknown.
    pub fn resolve(
        &self,
        key: &str,
        fallback: &str,
    ) -> Result<&DebateModeDefinition, ConfigError> {
        match self.lookup(key) {
            Ok(mode) => Ok(mode),
            Err(err) => {
                warn!(requested = key, fallback, "{err}; using fallback mode");
                self.lookup(fallback)
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DebateModeDefinition> {
        self.modes.iter()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

// ── Top-level ───────────────────────────────────────────────────────────────

/// Complete configuration snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConclaveConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub debate: DebateSettings,
    pub backends: BackendRegistry,
    pub modes: ModeRegistry,
    pub prompts: HashMap<String, String>,
}

impl Default for ConclaveConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            debate: DebateSettings::default(),
            backends: BackendRegistry::new(defaults::backends()),
            modes: ModeRegistry::new(defaults::modes()),
            prompts: defaults::prompts(),
        }
    }
}

impl ConclaveConfig {
    /// Check cross-field invariants. Called by every loader entry point.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backends.is_empty() {
            return Err(ConfigError::Invalid("no backends configured".to_string()));
        }

        let mut seen = std::collections::HashSet::new();
        for backend in self.backends.iter() {
            if !seen.insert(backend.key.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate backend key '{}'",
                    backend.key
                )));
            }
        }

        if !self.backends.contains(&self.debate.synthesizer) {
            return Err(ConfigError::Invalid(format!(
                "synthesizer '{}' is not a configured backend",
                self.debate.synthesizer
            )));
        }

        self.modes.lookup(&self.debate.default_mode).map_err(|_| {
            ConfigError::Invalid(format!(
                "default mode '{}' is not defined",
                self.debate.default_mode
            ))
        })?;

        for mode in self.modes.iter() {
            if mode.rounds.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "mode '{}' declares no rounds",
                    mode.key
                )));
            }
            for (idx, spec) in mode.rounds.iter().enumerate() {
                let expected = idx as u32 + 1;
                if spec.round != expected {
                    return Err(ConfigError::Invalid(format!(
                        "mode '{}': round {} declared where round {} was expected",
                        mode.key, spec.round, expected
                    )));
                }
            }
            for spec in mode.unrecognized_rounds() {
                warn!(
                    mode = %mode.key,
                    round = spec.round,
                    round_type = %spec.round_type,
                    "unknown round type, the round will be skipped"
                );
            }
        }

        if self.api.retry_attempts == 0 {
            return Err(ConfigError::Invalid(
                "api.retry_attempts must be at least 1".to_string(),
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
