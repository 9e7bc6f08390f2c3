// Configuration structs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::patterns::{Rule, Scenario};

/// Inference server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// "ollama" or "none" (null backend, prompts are never sent anywhere)
    pub provider: String,
    /// Base URL of the inference server
    pub base_url: String,
    /// Model name passed to the server
    pub model: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Misinformation guard settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TruthSeekingConfig {
    /// Master switch; when off every prompt is forwarded
    pub enabled: bool,

    /// Built-in detectors to run, in order
    pub scenarios: Vec<Scenario>,

    /// Proximity knob for flexible matching (currently not used in scoring)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<usize>,

    /// Extra synonym groups: concept -> surface forms
    pub synonyms: BTreeMap<String, Vec<String>>,

    /// Inline custom rules
    pub rules: Vec<Rule>,

    /// Optional JSON rule pack loaded in addition to inline rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<PathBuf>,

    /// Corrective response overrides keyed by scenario name
    pub responses: BTreeMap<String, String>,
}

impl Default for TruthSeekingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scenarios: Scenario::ALL.to_vec(),
            max_distance: None,
            synonyms: BTreeMap::new(),
            rules: Vec::new(),
            rules_file: None,
            responses: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// JSONL audit log of guard decisions (disabled when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<PathBuf>,

    /// Force debug-level tracing output
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub truth_seeking: TruthSeekingConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> anyhow::Result<()> {
        use crate::errors;

        let valid_providers = ["ollama", "none"];
        if !valid_providers.contains(&self.backend.provider.as_str()) {
            anyhow::bail!(errors::wrap_error_with_suggestion(
                format!("Invalid backend provider '{}'", self.backend.provider),
                &format!("Valid providers: {}", valid_providers.join(", ")),
            ));
        }

        if self.backend.provider == "ollama" {
            let url = &self.backend.base_url;
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!(errors::wrap_error_with_suggestion(
                    format!("Invalid backend base_url: '{}'", url),
                    "Base URL should include the scheme\n\
                     Example: http://localhost:11434",
                ));
            }
            if self.backend.model.trim().is_empty() {
                anyhow::bail!("backend.model must not be empty");
            }
        }

        if self.backend.timeout_seconds == 0 {
            anyhow::bail!("backend.timeout_seconds must be greater than 0");
        }

        for key in self.truth_seeking.responses.keys() {
            if key.parse::<Scenario>().is_err() {
                anyhow::bail!(errors::wrap_error_with_suggestion(
                    format!("Response override for unknown scenario '{}'", key),
                    &format!(
                        "Known scenarios: {}",
                        Scenario::ALL.map(|s| s.as_str()).join(", ")
                    ),
                ));
            }
        }

        for rule in &self.truth_seeking.rules {
            rule.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.truth_seeking.enabled);
        assert_eq!(config.truth_seeking.scenarios.len(), 3);
        assert_eq!(config.backend.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_invalid_provider() {
        let mut config = Config::default();
        config.backend.provider = "claude".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.backend.base_url = "localhost:11434".to_string();
        assert!(config.validate().is_err());

        // Not checked for the null backend
        config.backend.provider = "none".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_response_override() {
        let mut config = Config::default();
        config
            .truth_seeking
            .responses
            .insert("moon_landing".to_string(), "x".to_string());
        assert!(config.validate().is_err());
    }
}
