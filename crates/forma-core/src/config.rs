//! Configuration file management for forma.
//!
//! Supports reading secrets from `~/.config/forma/secret.json`. Callers fall
//! back to environment variables when the file or a section is absent.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::error::{FormaError, Result};

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub openai: Option<OpenAiConfig>,
}

/// OpenAI API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub reasoning_effort: Option<String>,
}

/// Loads the secret configuration file from ~/.config/forma/secret.json
pub fn load_secret_config() -> Result<SecretConfig> {
    let config_path = secret_config_path()?;

    if !config_path.exists() {
        return Err(FormaError::config(format!(
            "Configuration file not found at: {}",
            config_path.display()
        )));
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        FormaError::io(format!(
            "Failed to read configuration file at {}: {}",
            config_path.display(),
            e
        ))
    })?;

    parse_secret_config(&content)
}

fn parse_secret_config(content: &str) -> Result<SecretConfig> {
    Ok(serde_json::from_str(content)?)
}

/// Returns the path to the configuration file: ~/.config/forma/secret.json
fn secret_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FormaError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join("forma").join("secret.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_secret_config(
            r#"{
                "openai": {
                    "api_key": "sk-test",
                    "model_name": "gpt-4o-mini",
                    "reasoning_effort": "low"
                }
            }"#,
        )
        .unwrap();

        let openai = config.openai.unwrap();
        assert_eq!(openai.api_key, "sk-test");
        assert_eq!(openai.model_name.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(openai.reasoning_effort.as_deref(), Some("low"));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_secret_config(r#"{"openai": {"api_key": "sk-test"}}"#).unwrap();
        let openai = config.openai.unwrap();
        assert!(openai.model_name.is_none());
        assert!(openai.reasoning_effort.is_none());
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_secret_config("{}").unwrap();
        assert!(config.openai.is_none());
    }

    #[test]
    fn test_parse_invalid_config() {
        let err = parse_secret_config("not json").unwrap_err();
        assert!(matches!(err, FormaError::Serialization { .. }));
    }
}
