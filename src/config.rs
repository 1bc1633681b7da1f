//! Configuration management for QueryGPT
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{QueryGptError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest page the backend will serve; it clamps anything above this.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Main configuration structure for QueryGPT
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// History loading settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Interactive chat settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Q&A backend (scheme, host and port)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Provider tag sent with every question
    #[serde(default = "default_llm_provider")]
    pub llm_provider: String,

    /// Optional request timeout in seconds
    ///
    /// Unset by default: a hung request keeps the client waiting until the
    /// user interrupts it.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            llm_provider: default_llm_provider(),
            timeout_seconds: None,
        }
    }
}

/// History loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of sessions requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Load the first page of history when an interactive session starts
    #[serde(default = "default_load_on_start")]
    pub load_on_start: bool,
}

fn default_page_size() -> u32 {
    50
}

fn default_load_on_start() -> bool {
    true
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            load_on_start: default_load_on_start(),
        }
    }
}

/// Interactive chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Show suggested questions on the welcome screen
    #[serde(default = "default_show_suggestions")]
    pub show_suggestions: bool,
}

fn default_show_suggestions() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            show_suggestions: default_show_suggestions(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| QueryGptError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| QueryGptError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("QUERYGPT_BASE_URL") {
            tracing::debug!(base_url = %base_url, "Env override: QUERYGPT_BASE_URL");
            self.api.base_url = base_url;
        }

        if let Ok(provider) = std::env::var("QUERYGPT_LLM_PROVIDER") {
            self.api.llm_provider = provider;
        }

        if let Ok(timeout) = std::env::var("QUERYGPT_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.api.timeout_seconds = Some(v),
                Err(_) => tracing::warn!("Invalid QUERYGPT_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(page_size) = std::env::var("QUERYGPT_HISTORY_PAGE_SIZE") {
            match page_size.parse::<u32>() {
                Ok(v) => self.history.page_size = v,
                Err(_) => tracing::warn!("Invalid QUERYGPT_HISTORY_PAGE_SIZE: {}", page_size),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.base_url {
            tracing::debug!("CLI override: base_url={}", base_url);
            self.api.base_url = base_url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an absolute http(s) URL, the
    /// provider tag is empty, or the page size is outside the range the
    /// backend accepts.
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.api.base_url).map_err(|e| {
            QueryGptError::Config(format!("Invalid api.base_url '{}': {}", self.api.base_url, e))
        })?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(QueryGptError::Config(format!(
                "api.base_url must use http or https, got {}",
                base.scheme()
            ))
            .into());
        }

        if self.api.llm_provider.trim().is_empty() {
            return Err(
                QueryGptError::Config("api.llm_provider cannot be empty".to_string()).into(),
            );
        }

        if self.api.timeout_seconds == Some(0) {
            return Err(QueryGptError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.history.page_size == 0 || self.history.page_size > MAX_PAGE_SIZE {
            return Err(QueryGptError::Config(format!(
                "history.page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::test_utils::{create_test_file, temp_dir};
    use serial_test::serial;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.llm_provider, "openai");
        assert_eq!(config.history.page_size, 50);
        assert!(config.api.timeout_seconds.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "api:\n  base_url: https://qa.example.com\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "https://qa.example.com");
        assert_eq!(config.api.llm_provider, "openai");
        assert!(config.history.load_on_start);
        assert!(config.chat.show_suggestions);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid api.base_url"));
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let mut config = Config::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_page_size_out_of_range() {
        let mut config = Config::default();
        config.history.page_size = 0;
        assert!(config.validate().is_err());
        config.history.page_size = MAX_PAGE_SIZE + 1;
        assert!(config.validate().is_err());
        config.history.page_size = MAX_PAGE_SIZE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_provider() {
        let mut config = Config::default();
        config.api.llm_provider = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        let dir = temp_dir();
        let path = dir.path().join("missing.yaml");
        let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
        assert_eq!(config.history.page_size, 50);
    }

    #[test]
    #[serial]
    fn test_load_from_file_and_cli_override() {
        let dir = temp_dir();
        let path = create_test_file(
            &dir,
            "config.yaml",
            "api:\n  base_url: http://from-file:9000\n  llm_provider: deepseek\n\
             history:\n  page_size: 20\n",
        );

        let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
        assert_eq!(config.api.base_url, "http://from-file:9000");
        assert_eq!(config.api.llm_provider, "deepseek");
        assert_eq!(config.history.page_size, 20);

        let cli = Cli {
            base_url: Some("http://from-cli:1234".to_string()),
            ..Cli::default()
        };
        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.api.base_url, "http://from-cli:1234");
    }

    #[test]
    #[serial]
    fn test_load_rejects_malformed_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "config.yaml", "api: [unclosed");
        let err = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("QUERYGPT_LLM_PROVIDER", "anthropic");
        std::env::set_var("QUERYGPT_HISTORY_PAGE_SIZE", "not-a-number");
        std::env::set_var("QUERYGPT_TIMEOUT_SECONDS", "15");

        let dir = temp_dir();
        let path = dir.path().join("missing.yaml");
        let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();

        std::env::remove_var("QUERYGPT_LLM_PROVIDER");
        std::env::remove_var("QUERYGPT_HISTORY_PAGE_SIZE");
        std::env::remove_var("QUERYGPT_TIMEOUT_SECONDS");

        assert_eq!(config.api.llm_provider, "anthropic");
        assert_eq!(config.history.page_size, 50);
        assert_eq!(config.api.timeout_seconds, Some(15));
    }
}
