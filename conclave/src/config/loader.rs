//! File and environment loading for [`ConclaveConfig`].
//!
//! The file format follows the extension: `.toml` is parsed as TOML, anything
//! else as YAML. A missing file is not an error for [`ConclaveConfig::load_or_default`].

use std::path::Path;

use tracing::{debug, info};

use super::ConclaveConfig;
use crate::error::ConfigError;

/// Primary API key variable.
pub const ENV_API_KEY: &str = "CONCLAVE_API_KEY";
/// Consulted when [`ENV_API_KEY`] is unset.
pub const ENV_FALLBACK_API_KEY: &str = "OPENROUTER_API_KEY";
/// Overrides `api.base_url`.
pub const ENV_BASE_URL: &str = "CONCLAVE_BASE_URL";
/// Overrides `storage.sessions_dir`.
pub const ENV_SESSIONS_DIR: &str = "CONCLAVE_SESSIONS_DIR";

impl ConclaveConfig {
    /// Parse a configuration file, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        let mut config = if is_toml {
            Self::from_toml_str(&raw)
        } else {
            Self::from_yaml_str(&raw)
        }
        .map_err(|reason| ConfigError::Parse {
            path: shown.clone(),
            reason,
        })?;

        config.apply_env_overrides();
        config.validate()?;
        info!(
            path = %shown,
            backends = config.backends.len(),
            modes = config.modes.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Like [`load`](Self::load) but returns built-in defaults when `path` does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load(path);
        }
        debug!(path = %path.display(), "config file not found, using built-in defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without touching the environment.
    pub fn from_yaml_str(raw: &str) -> Result<Self, String> {
        serde_yaml::from_str(raw).map_err(|e| e.to_string())
    }

    /// Parse TOML without touching the environment.
    pub fn from_toml_str(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| e.to_string())
    }

    /// Apply `CONCLAVE_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY).or_else(|| non_empty(ENV_FALLBACK_API_KEY)) {
            self.api.api_key = key;
        }
        if let Some(url) = non_empty(ENV_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(dir) = non_empty(ENV_SESSIONS_DIR) {
            self.storage.sessions_dir = dir.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;
    use crate::config::RoundType;

    const YAML: &str = r#"
api:
  base_url: "http://localhost:9999/v1"
  retry_attempts: 2
debate:
  synthesizer: alpha
  default_mode: fast
backends:
  - key: alpha
    name: Alpha
    id: vendor/alpha-1
    role: Strategist
    specialization: [planning, risk]
  - key: beta
    name: Beta
    id: vendor/beta-2
modes:
  - key: fast
    name: Fast
    rounds:
      - { round: 1, type: independent_generation, name: Answers }
      - { round: 2, type: brainstorm, name: Mystery }
"#;

    #[test]
    fn test_yaml_parse_preserves_order_and_defaults() {
        let config = ConclaveConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(config.backends.keys(), vec!["alpha", "beta"]);

        let beta = config.backends.lookup("beta").unwrap();
        assert_eq!(beta.role, "Analyst");
        assert_eq!(beta.color, "⚪");
        assert_eq!(beta.max_tokens, 8192);
        assert!((beta.temperature - 0.2).abs() < f32::EPSILON);

        let fast = config.modes.lookup("fast").unwrap();
        assert_eq!(
            fast.rounds[1].round_type,
            RoundType::Unrecognized("brainstorm".to_string())
        );
        assert_eq!(config.api.retry_attempts, 2);
        assert_eq!(config.api.timeout_secs, 60);
        config.validate().unwrap();
    }

    #[test]
    fn test_toml_parse() {
        let raw = r#"
[debate]
synthesizer = "solo"
default_mode = "one"

[[backends]]
key = "solo"
name = "Solo"
id = "vendor/solo"

[[modes]]
key = "one"
name = "One"

[[modes.rounds]]
round = 1
type = "independent_generation"
name = "Answers"
"#;
        let config = ConclaveConfig::from_toml_str(raw).unwrap();
        config.validate().unwrap();
        assert_eq!(config.backends.len(), 1);
        assert_eq!(config.modes.lookup("one").unwrap().rounds.len(), 1);
    }

    #[test]
    fn test_load_reads_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let config = ConclaveConfig::load(file.path()).unwrap();
        assert_eq!(config.debate.synthesizer, "alpha");
    }

    #[test]
    fn test_load_logs_source_path() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let logs = crate::test_support::capture_logs();
        ConclaveConfig::load(file.path()).unwrap();

        let output = logs.contents();
        assert!(output.contains("configuration loaded"));
        assert!(output.contains(&file.path().display().to_string()));
        assert!(output.contains("backends=2"));
    }

    #[test]
    fn test_shipped_sample_config_parses() {
        let raw = include_str!("../../../conclave.yaml");
        let config = ConclaveConfig::from_yaml_str(raw).unwrap();
        config.validate().unwrap();
        assert_eq!(config.modes.len(), 3);
        assert_eq!(config.backends.len(), 4);
        assert_eq!(config.api.title.as_deref(), Some("Conclave"));
    }

    #[test]
    fn test_load_reports_parse_error_with_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(b"this is = = not toml").unwrap();

        let err = ConclaveConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let err = ConclaveConfig::load(Path::new("/nonexistent/conclave.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let config =
            ConclaveConfig::load_or_default(Path::new("/nonexistent/conclave.yaml")).unwrap();
        assert_eq!(config.debate.synthesizer, "chatgpt");
    }

    #[test]
    fn test_env_overrides_prefer_primary_key() {
        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "primary"),
            (ENV_FALLBACK_API_KEY, "fallback"),
            (ENV_BASE_URL, "http://proxy/v1"),
            (ENV_SESSIONS_DIR, "/tmp/sessions"),
        ]
        .into_iter()
        .collect();

        let mut config = ConclaveConfig::default();
        config.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.api.api_key, "primary");
        assert_eq!(config.api.base_url, "http://proxy/v1");
        assert_eq!(config.storage.sessions_dir, Path::new("/tmp/sessions"));
    }

    #[test]
    fn test_env_overrides_fall_back_and_ignore_blank() {
        let env: HashMap<&str, &str> = [(ENV_API_KEY, "  "), (ENV_FALLBACK_API_KEY, "fallback")]
            .into_iter()
            .collect();

        let mut config = ConclaveConfig::default();
        config.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.api.api_key, "fallback");
        assert_eq!(config.api.base_url, "https://openrouter.ai/api/v1");
    }
}
