use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::agent::{AgentProfile, AgentRole};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion service (Anthropic Messages API) configuration
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Web search (Tavily) configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Per-role model and budget settings
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Job lifecycle configuration
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS. Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Interval between SSE keep-alive comments
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Longest accepted product description
    #[serde(default = "default_max_product_chars")]
    pub max_product_chars: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_keep_alive_secs() -> u64 {
    15
}

const fn default_max_product_chars() -> usize {
    200
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
            keep_alive_secs: default_keep_alive_secs(),
            max_product_chars: default_max_product_chars(),
        }
    }
}

/// Anthropic Messages API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnthropicConfig {
    /// API key (falls back to `ANTHROPIC_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_anthropic_url")]
    pub base_url: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_anthropic_timeout")]
    pub timeout_secs: u64,
}

fn default_anthropic_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

const fn default_anthropic_timeout() -> u64 {
    300
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_anthropic_url(),
            api_version: default_api_version(),
            timeout_secs: default_anthropic_timeout(),
        }
    }
}

impl AnthropicConfig {
    /// API key from config or environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|key| !key.is_empty())
    }
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchConfig {
    /// API key (falls back to `TAVILY_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_search_url")]
    pub base_url: String,

    /// Tavily search depth: basic or advanced
    #[serde(default = "default_search_depth")]
    pub search_depth: String,

    /// Snippet length fed back to the model
    #[serde(default = "default_max_snippet_chars")]
    pub max_snippet_chars: usize,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

fn default_search_url() -> String {
    "https://api.tavily.com".to_string()
}

fn default_search_depth() -> String {
    "advanced".to_string()
}

const fn default_max_snippet_chars() -> usize {
    500
}

const fn default_search_timeout() -> u64 {
    60
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_search_url(),
            search_depth: default_search_depth(),
            max_snippet_chars: default_max_snippet_chars(),
            timeout_secs: default_search_timeout(),
        }
    }
}

impl SearchConfig {
    /// API key from config or environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("TAVILY_API_KEY").ok())
            .filter(|key| !key.is_empty())
    }
}

/// Per-role agent settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AgentsConfig {
    #[serde(default = "default_advocate")]
    pub advocate: AgentProfile,

    #[serde(default = "default_skeptic")]
    pub skeptic: AgentProfile,

    #[serde(default = "default_economist")]
    pub economist: AgentProfile,

    #[serde(default = "default_alternatives")]
    pub alternatives: AgentProfile,

    #[serde(default = "default_orchestrator")]
    pub orchestrator: AgentProfile,

    /// Hard cap on completion round-trips per agent
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

const SONNET: &str = "claude-sonnet-4-6";
const HAIKU: &str = "claude-haiku-4-5";

fn default_advocate() -> AgentProfile {
    AgentProfile::new(SONNET, 4096, 10)
}

fn default_skeptic() -> AgentProfile {
    AgentProfile::new(SONNET, 2048, 7)
}

fn default_economist() -> AgentProfile {
    AgentProfile::new(SONNET, 4096, 7)
}

fn default_alternatives() -> AgentProfile {
    AgentProfile::new(HAIKU, 1024, 3)
}

fn default_orchestrator() -> AgentProfile {
    AgentProfile::new(SONNET, 512, 0)
}

const fn default_max_turns() -> u32 {
    30
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            advocate: default_advocate(),
            skeptic: default_skeptic(),
            economist: default_economist(),
            alternatives: default_alternatives(),
            orchestrator: default_orchestrator(),
            max_turns: default_max_turns(),
        }
    }
}

impl AgentsConfig {
    pub fn profile(&self, role: AgentRole) -> &AgentProfile {
        match role {
            AgentRole::Advocate => &self.advocate,
            AgentRole::Skeptic => &self.skeptic,
            AgentRole::Economist => &self.economist,
            AgentRole::Alternatives => &self.alternatives,
            AgentRole::Orchestrator => &self.orchestrator,
        }
    }
}

/// Job lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JobsConfig {
    /// Jobs whose stream is not attached within this window are dropped
    #[serde(default = "default_unclaimed_ttl")]
    pub unclaimed_ttl_secs: u64,

    #[serde(default = "default_reap_interval")]
    pub reap_interval_secs: u64,
}

const fn default_unclaimed_ttl() -> u64 {
    600
}

const fn default_reap_interval() -> u64 {
    60
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            unclaimed_ttl_secs: default_unclaimed_ttl(),
            reap_interval_secs: default_reap_interval(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stdout only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_stdout: default_true(),
            rotation: default_rotation(),
        }
    }
}
