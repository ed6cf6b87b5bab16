//! Configuration management

use std::{path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration (standby mode)
    pub server: ServerConfig,
    /// Platform API configuration
    pub platform: PlatformConfig,
    /// AI transform configuration
    pub ai: AiConfig,
    /// Publish flow configuration
    pub publish: PublishConfig,
    /// Agent-builder configuration
    pub agent: AgentConfig,
}

/// HTTP server configuration for standby mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on (overridden by `ACTOR_STANDBY_PORT` when set)
    pub port: u16,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Per-request timeout as a `Duration`
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Platform API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Base URL of the platform API
    pub base_url: String,
    /// API token. Absent token switches the dataset sink to local storage;
    /// publish and agent flows require it.
    pub token: Option<String>,
    /// Dataset name or id for result records
    pub dataset: String,
    /// Local storage directory used when no token is configured
    pub storage_dir: String,
    /// Timeout for platform API calls in seconds
    pub timeout_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.apify.com".to_string(),
            token: None,
            dataset: "default".to_string(),
            storage_dir: "storage".to_string(),
            timeout_secs: 30,
        }
    }
}

impl PlatformConfig {
    /// Timeout for API calls as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve the token, failing when it is required but absent
    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::Config("platform token is required (set ACTOR_PLATFORM__TOKEN)".to_string())
            })
    }
}

/// AI transform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Chat-completion endpoint URL. Unset disables the `ai` transform.
    pub endpoint: Option<String>,
    /// API key sent as a bearer token, if the endpoint needs one
    pub api_key: Option<String>,
    /// Model name passed through to the endpoint
    pub model: String,
    /// Call timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AiConfig {
    /// Call timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Publish flow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// How long to wait for a build to finish, in seconds
    pub build_timeout_secs: u64,
    /// How often to poll the build status, in seconds
    pub poll_interval_secs: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            build_timeout_secs: 120,
            poll_interval_secs: 3,
        }
    }
}

impl PublishConfig {
    /// Build wait deadline as a `Duration`
    #[must_use]
    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }

    /// Poll interval as a `Duration`
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Agent-builder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Code-generation agent executable
    pub command: String,
    /// Arguments passed before the prompt
    pub args: Vec<String>,
    /// Dependency install executable run in the scaffolded project
    pub install_command: String,
    /// Arguments for the install command
    pub install_args: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: "claude".to_string(),
            args: vec!["-p".to_string()],
            install_command: "npm".to_string(),
            install_args: vec!["install".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from an optional YAML file plus `ACTOR_*`
    /// environment variables. Env keys use `__` as the section separator,
    /// e.g. `ACTOR_PLATFORM__TOKEN`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                figment = figment.merge(Yaml::file(p));
            }
            None => {
                figment = figment.merge(Yaml::file("actor.yaml"));
            }
        }

        figment
            .merge(Env::prefixed("ACTOR_").split("__"))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.platform.dataset, "default");
        assert!(config.platform.token.is_none());
        assert!(config.ai.endpoint.is_none());
        assert_eq!(config.publish.build_timeout_secs, 120);
    }

    #[test]
    fn require_token_rejects_absent_and_empty() {
        let mut platform = PlatformConfig::default();
        assert!(platform.require_token().is_err());

        platform.token = Some(String::new());
        assert!(platform.require_token().is_err());

        platform.token = Some("tok_123".to_string());
        assert_eq!(platform.require_token().unwrap(), "tok_123");
    }
}
