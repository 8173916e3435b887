use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::models::AgentRole;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "shouldibuy.yaml";

/// Prefix of environment overrides, e.g. `SHOULDIBUY_SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "SHOULDIBUY_";

/// Configuration error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid port: 0")]
    InvalidPort,

    #[error("Invalid search budget for {0}: {1}. Must be at least 1")]
    InvalidSearchBudget(AgentRole, u32),

    #[error("The orchestrator does not search; its search budget must be 0, got {0}")]
    OrchestratorSearchBudget(u32),

    #[error("Invalid max_tokens for {0}: must be at least 1")]
    InvalidMaxTokens(AgentRole),

    #[error("Model for {0} cannot be empty")]
    EmptyModel(AgentRole),

    #[error("Invalid max_turns: {0}. Must be at least 1")]
    InvalidMaxTurns(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Invalid max_product_chars: must be at least 1")]
    InvalidMaxProductChars,

    #[error("Invalid max_snippet_chars: must be at least 1")]
    InvalidMaxSnippetChars,
}

const SEARCHING_ROLES: [AgentRole; 4] = [
    AgentRole::Advocate,
    AgentRole::Skeptic,
    AgentRole::Economist,
    AgentRole::Alternatives,
];

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `path`, or `shouldibuy.yaml` in the working directory if present
    /// 3. Environment variables (`SHOULDIBUY_*`, `__` separates sections)
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let file = match path {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Yaml::file(path)
            }
            None => Yaml::file(DEFAULT_CONFIG_FILE),
        };

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, without environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if config.server.max_product_chars == 0 {
            return Err(ConfigError::InvalidMaxProductChars);
        }
        if config.search.max_snippet_chars == 0 {
            return Err(ConfigError::InvalidMaxSnippetChars);
        }

        let agents = &config.agents;
        for role in SEARCHING_ROLES {
            let budget = agents.profile(role).search_budget;
            if budget == 0 {
                return Err(ConfigError::InvalidSearchBudget(role, budget));
            }
        }
        if agents.orchestrator.search_budget != 0 {
            return Err(ConfigError::OrchestratorSearchBudget(
                agents.orchestrator.search_budget,
            ));
        }
        for role in SEARCHING_ROLES.into_iter().chain([AgentRole::Orchestrator]) {
            let profile = agents.profile(role);
            if profile.max_tokens == 0 {
                return Err(ConfigError::InvalidMaxTokens(role));
            }
            if profile.model.trim().is_empty() {
                return Err(ConfigError::EmptyModel(role));
            }
        }
        if agents.max_turns == 0 {
            return Err(ConfigError::InvalidMaxTurns(agents.max_turns));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }
}
