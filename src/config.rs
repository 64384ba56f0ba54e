//! Configuration management for docquery
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{DocQueryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Agent id sent with every query when none is configured
pub const DEFAULT_AGENT_ID: &str = "document-search-agent";

/// Main configuration structure for docquery
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote agent and document backend settings
    #[serde(default)]
    pub agent: AgentConfig,
    /// Simulated upload pipeline settings
    #[serde(default)]
    pub upload: UploadConfig,
    /// Chat session settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Remote agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// URL queries are POSTed to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Fixed agent identifier included in every request body
    #[serde(default = "default_agent_id")]
    pub agent_id: String,

    /// Optional request timeout in seconds
    ///
    /// Unset by default: a query stays in flight until the agent answers
    /// or the user cancels it with `/stop`.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Optional base URL of a document backend
    ///
    /// When set, confirmed deletes are sent as `DELETE {base}/documents/{id}`.
    /// When unset, deletes only touch the in-session registry.
    #[serde(default)]
    pub documents_endpoint: Option<String>,
}

fn default_endpoint() -> String {
    "http://localhost:3000/api/agent".to_string()
}

fn default_agent_id() -> String {
    DEFAULT_AGENT_ID.to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            agent_id: default_agent_id(),
            timeout_seconds: None,
            documents_endpoint: None,
        }
    }
}

/// Simulated upload configuration
///
/// Progress advances by a random increment on every tick and stays
/// below the registry cap until processing finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Interval between progress ticks (milliseconds)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Largest random progress increment per tick (percent)
    #[serde(default = "default_max_increment")]
    pub max_increment: u8,

    /// Simulated processing time before an upload completes (milliseconds)
    #[serde(default = "default_processing_time_ms")]
    pub processing_time_ms: u64,

    /// Smallest synthesized page count
    #[serde(default = "default_min_pages")]
    pub min_pages: u32,

    /// Largest synthesized page count
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_tick_interval_ms() -> u64 {
    200
}

fn default_max_increment() -> u8 {
    30
}

fn default_processing_time_ms() -> u64 {
    2_000
}

fn default_min_pages() -> u32 {
    5
}

fn default_max_pages() -> u32 {
    54
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_increment: default_max_increment(),
            processing_time_ms: default_processing_time_ms(),
            min_pages: default_min_pages(),
            max_pages: default_max_pages(),
        }
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Maximum follow-up suggestions shown under an answer
    #[serde(default = "default_follow_up_limit")]
    pub follow_up_limit: usize,

    /// Refuse queries until at least one document is uploaded
    #[serde(default = "default_require_documents")]
    pub require_documents: bool,
}

fn default_follow_up_limit() -> usize {
    3
}

fn default_require_documents() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            follow_up_limit: default_follow_up_limit(),
            require_documents: default_require_documents(),
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
            .map_err(|e| DocQueryError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| DocQueryError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(endpoint) = std::env::var("DOCQUERY_AGENT_ENDPOINT") {
            tracing::debug!(endpoint = %endpoint, "Env override: DOCQUERY_AGENT_ENDPOINT");
            self.agent.endpoint = endpoint;
        }

        if let Ok(agent_id) = std::env::var("DOCQUERY_AGENT_ID") {
            self.agent.agent_id = agent_id;
        }

        if let Ok(timeout) = std::env::var("DOCQUERY_AGENT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.agent.timeout_seconds = Some(value);
            } else {
                tracing::warn!("Invalid DOCQUERY_AGENT_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(documents_endpoint) = std::env::var("DOCQUERY_DOCUMENTS_ENDPOINT") {
            self.agent.documents_endpoint = Some(documents_endpoint);
        }

        if let Ok(limit) = std::env::var("DOCQUERY_FOLLOW_UP_LIMIT") {
            if let Ok(value) = limit.parse() {
                self.chat.follow_up_limit = value;
            } else {
                tracing::warn!("Invalid DOCQUERY_FOLLOW_UP_LIMIT: {}", limit);
            }
        }

        if let Ok(require) = std::env::var("DOCQUERY_REQUIRE_DOCUMENTS") {
            match require.parse::<bool>() {
                Ok(v) => self.chat.require_documents = v,
                Err(_) => tracing::warn!("Invalid DOCQUERY_REQUIRE_DOCUMENTS: {}", require),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(endpoint) = &cli.endpoint {
            tracing::debug!("Using agent endpoint override from CLI: {}", endpoint);
            self.agent.endpoint = endpoint.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns a `DocQueryError::Config` describing the first invalid field
    pub fn validate(&self) -> Result<()> {
        validate_http_url("agent.endpoint", &self.agent.endpoint)?;

        if self.agent.agent_id.trim().is_empty() {
            return Err(DocQueryError::Config("agent.agent_id cannot be empty".to_string()).into());
        }

        if self.agent.timeout_seconds == Some(0) {
            return Err(DocQueryError::Config(
                "agent.timeout_seconds must be greater than 0 when set".to_string(),
            )
            .into());
        }

        if let Some(documents_endpoint) = &self.agent.documents_endpoint {
            validate_http_url("agent.documents_endpoint", documents_endpoint)?;
        }

        if self.upload.tick_interval_ms == 0 {
            return Err(DocQueryError::Config(
                "upload.tick_interval_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if self.upload.max_increment == 0 || self.upload.max_increment > 90 {
            return Err(DocQueryError::Config(
                "upload.max_increment must be between 1 and 90".to_string(),
            )
            .into());
        }

        if self.upload.min_pages == 0 {
            return Err(DocQueryError::Config(
                "upload.min_pages must be greater than 0".to_string(),
            )
            .into());
        }

        if self.upload.min_pages > self.upload.max_pages {
            return Err(DocQueryError::Config(
                "upload.min_pages must not exceed upload.max_pages".to_string(),
            )
            .into());
        }

        if self.chat.follow_up_limit == 0 {
            return Err(DocQueryError::Config(
                "chat.follow_up_limit must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| DocQueryError::Config(format!("{} is not a valid URL: {}", field, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(DocQueryError::Config(format!(
            "{} must use http or https, got {}",
            field, other
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_error_contains, create_test_file, temp_dir, test_config_yaml};
    use serial_test::serial;

    const ENV_VARS: [&str; 6] = [
        "DOCQUERY_AGENT_ENDPOINT",
        "DOCQUERY_AGENT_ID",
        "DOCQUERY_AGENT_TIMEOUT_SECONDS",
        "DOCQUERY_DOCUMENTS_ENDPOINT",
        "DOCQUERY_FOLLOW_UP_LIMIT",
        "DOCQUERY_REQUIRE_DOCUMENTS",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.agent.endpoint, "http://localhost:3000/api/agent");
        assert_eq!(config.agent.agent_id, DEFAULT_AGENT_ID);
        assert!(config.agent.timeout_seconds.is_none());
        assert!(config.agent.documents_endpoint.is_none());
        assert_eq!(config.chat.follow_up_limit, 3);
        assert!(config.chat.require_documents);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_endpoint() {
        let mut config = Config::default();
        config.agent.endpoint = "not a url".to_string();
        assert_error_contains(config.validate(), "agent.endpoint is not a valid URL");

        config.agent.endpoint = "ftp://example.com/api/agent".to_string();
        assert_error_contains(config.validate(), "agent.endpoint");
    }

    #[test]
    fn test_config_validation_empty_agent_id() {
        let mut config = Config::default();
        config.agent.agent_id = "  ".to_string();
        assert_error_contains(config.validate(), "agent.agent_id cannot be empty");
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.agent.timeout_seconds = Some(0);
        assert!(config.validate().is_err());

        config.agent.timeout_seconds = Some(30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_upload_bounds() {
        let mut config = Config::default();
        config.upload.max_increment = 0;
        assert!(config.validate().is_err());

        config.upload.max_increment = 91;
        assert!(config.validate().is_err());

        config.upload.max_increment = 30;
        config.upload.min_pages = 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_follow_up_limit() {
        let mut config = Config::default();
        config.chat.follow_up_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
agent:
  endpoint: https://search.example.com/api/agent
  agent_id: contracts-agent
  timeout_seconds: 45
  documents_endpoint: https://search.example.com
upload:
  tick_interval_ms: 50
  max_increment: 10
chat:
  follow_up_limit: 5
  require_documents: false
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.agent.endpoint, "https://search.example.com/api/agent");
        assert_eq!(config.agent.agent_id, "contracts-agent");
        assert_eq!(config.agent.timeout_seconds, Some(45));
        assert_eq!(
            config.agent.documents_endpoint.as_deref(),
            Some("https://search.example.com")
        );
        assert_eq!(config.upload.tick_interval_ms, 50);
        assert_eq!(config.upload.max_increment, 10);
        assert_eq!(config.upload.processing_time_ms, 2_000);
        assert_eq!(config.chat.follow_up_limit, 5);
        assert!(!config.chat.require_documents);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.agent.agent_id, DEFAULT_AGENT_ID);
        assert_eq!(config.upload.max_pages, 54);
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        clear_env();
        let cli = crate::cli::Cli::default();
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.agent.endpoint, "http://localhost:3000/api/agent");
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        clear_env();
        let dir = temp_dir();
        let path = create_test_file(&dir, "config.yaml", &test_config_yaml());
        let cli = crate::cli::Cli::default();
        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.agent.endpoint, "http://localhost:4000/api/agent");
        assert_eq!(config.agent.timeout_seconds, Some(10));
        assert_eq!(config.upload.max_pages, 10);
        assert!(!config.chat.require_documents);
    }

    #[test]
    #[serial]
    fn test_load_malformed_file() {
        clear_env();
        let dir = temp_dir();
        let path = create_test_file(&dir, "config.yaml", "agent: [unclosed");
        let cli = crate::cli::Cli::default();
        assert_error_contains(
            Config::load(path.to_str().unwrap(), &cli),
            "Failed to parse config",
        );
    }

    #[test]
    #[serial]
    fn test_cli_endpoint_override() {
        clear_env();
        let cli = crate::cli::Cli {
            endpoint: Some("http://127.0.0.1:9999/api/agent".to_string()),
            ..Default::default()
        };
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.agent.endpoint, "http://127.0.0.1:9999/api/agent");
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_fields() {
        clear_env();
        std::env::set_var("DOCQUERY_AGENT_ENDPOINT", "http://env-host/api/agent");
        std::env::set_var("DOCQUERY_AGENT_ID", "env-agent");
        std::env::set_var("DOCQUERY_AGENT_TIMEOUT_SECONDS", "12");
        std::env::set_var("DOCQUERY_FOLLOW_UP_LIMIT", "not-a-number");
        std::env::set_var("DOCQUERY_REQUIRE_DOCUMENTS", "false");

        let mut config = Config::default();
        config.apply_env_vars();
        clear_env();

        assert_eq!(config.agent.endpoint, "http://env-host/api/agent");
        assert_eq!(config.agent.agent_id, "env-agent");
        assert_eq!(config.agent.timeout_seconds, Some(12));
        assert_eq!(config.chat.follow_up_limit, 3);
        assert!(!config.chat.require_documents);
    }

    #[test]
    #[serial]
    fn test_cli_override_wins_over_env() {
        clear_env();
        std::env::set_var("DOCQUERY_AGENT_ENDPOINT", "http://env-host/api/agent");
        let cli = crate::cli::Cli {
            endpoint: Some("http://cli-host/api/agent".to_string()),
            ..Default::default()
        };
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        clear_env();
        assert_eq!(config.agent.endpoint, "http://cli-host/api/agent");
    }
}
