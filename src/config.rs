use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level configuration for a query session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub llm: LlmConfig,
    pub maps: MapsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            llm: LlmConfig::default(),
            maps: MapsConfig::default(),
        }
    }
}

/// Chat-completions endpoint used to produce action plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 500,
            temperature: 0.0,
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).map_err(|_| {
            Error::Config(format!(
                "environment variable {} is not set",
                self.api_key_env
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapsConfig {
    /// Total geocoding tries, including the first.
    pub geocode_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub geocode_backoff_ms: u64,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            geocode_attempts: 3,
            geocode_backoff_ms: 500,
        }
    }
}

impl AppConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json_str(r#"{"maps": {"geocode_attempts": 5}}"#).unwrap();
        assert_eq!(config.maps.geocode_attempts, 5);
        assert_eq!(config.maps.geocode_backoff_ms, 500);
        assert_eq!(config.llm, LlmConfig::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"log_level": "debug", "llm": {{"model": "gpt-4o-mini"}}}}"#).unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 500);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            AppConfig::from_json_str("{not json"),
            Err(Error::SerdeJsonError(_))
        ));
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let llm = LlmConfig {
            api_key_env: "AIRSCHEDULE_TEST_KEY_THAT_IS_NOT_SET".into(),
            ..LlmConfig::default()
        };
        assert!(matches!(llm.api_key(), Err(Error::Config(_))));
    }
}
