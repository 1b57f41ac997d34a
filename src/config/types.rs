//! Configuration data model.
//!
//! Struct/enum definitions plus default values. Loading and precedence live
//! in `config::mod`.

use serde::{Deserialize, Serialize};

use super::defaults::{
    DEFAULT_ALLOWED_ORIGINS, DEFAULT_DESCRIPTION_MAX_CHARS, DEFAULT_DISCOVER_TOOL,
    DEFAULT_EXCHANGE_TIMEOUT_SECS, DEFAULT_EXECUTE_TOOL, DEFAULT_GATEWAY_TIMEOUT_SECS,
    DEFAULT_GATEWAY_URL, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_TOKENS, DEFAULT_MODEL_BASE_URL,
    DEFAULT_MODEL_ID, DEFAULT_MODEL_TIMEOUT_SECS, DEFAULT_RESULT_MAX_CHARS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SUMMARY_MAX_CHARS, DEFAULT_TEMPERATURE,
};

/// Provider wire protocol for model requests.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiProtocol {
    /// OpenAI-compatible `/chat/completions`.
    Completions,
    /// Content-block `/messages`.
    #[default]
    Messages,
}

impl ApiProtocol {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "completions" | "chat" | "openai" => Some(Self::Completions),
            "messages" | "anthropic" => Some(Self::Messages),
            _ => None,
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub gateway: GatewayConfig,
    pub agent: AgentConfig,
    pub server: ServerConfig,
}

/// Hosted language model connection.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub protocol: ApiProtocol,
    pub base_url: String,
    /// Literal key. Prefer `api_key_env` in checked-in files.
    pub api_key: String,
    /// Environment variable consulted when `api_key` is empty.
    pub api_key_env: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            protocol: ApiProtocol::default(),
            base_url: DEFAULT_MODEL_BASE_URL.into(),
            api_key: String::new(),
            api_key_env: Some("ANTHROPIC_API_KEY".into()),
            model: DEFAULT_MODEL_ID.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_MODEL_TIMEOUT_SECS,
        }
    }
}

/// Remote tool gateway connection.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct GatewayConfig {
    pub url: String,
    pub token: String,
    pub token_env: Option<String>,
    /// Gateway tool used for discovery.
    pub discover_tool: String,
    /// Gateway tool used for execution.
    pub execute_tool: String,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GATEWAY_URL.into(),
            token: String::new(),
            token_env: Some("RUBE_TOKEN".into()),
            discover_tool: DEFAULT_DISCOVER_TOOL.into(),
            execute_tool: DEFAULT_EXECUTE_TOOL.into(),
            timeout_secs: DEFAULT_GATEWAY_TIMEOUT_SECS,
        }
    }
}

impl GatewayConfig {
    /// The gateway is usable only with a bearer token.
    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

/// Orchestration loop bounds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum model invocations per exchange.
    pub max_iterations: usize,
    pub exchange_timeout_secs: u64,
    pub description_max_chars: usize,
    pub result_max_chars: usize,
    pub summary_max_chars: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            exchange_timeout_secs: DEFAULT_EXCHANGE_TIMEOUT_SECS,
            description_max_chars: DEFAULT_DESCRIPTION_MAX_CHARS,
            result_max_chars: DEFAULT_RESULT_MAX_CHARS,
            summary_max_chars: DEFAULT_SUMMARY_MAX_CHARS,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.into(),
            port: DEFAULT_SERVER_PORT,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
        }
    }
}
