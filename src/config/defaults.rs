//! Default configuration constants.
//!
//! Keeping defaults in one module lets config types, the loader, and tests
//! share the same literals.

/// Default model endpoint (content-block `/messages` protocol).
pub(super) const DEFAULT_MODEL_BASE_URL: &str = "https://api.anthropic.com/v1";
/// Default model id.
pub(super) const DEFAULT_MODEL_ID: &str = "claude-haiku-4-5";
/// Default completion budget per model call.
pub(super) const DEFAULT_MAX_TOKENS: u32 = 4096;
/// Default sampling temperature.
pub(super) const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Per-request HTTP timeout for model calls.
pub(super) const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 120;

/// Default remote tool gateway endpoint.
pub(super) const DEFAULT_GATEWAY_URL: &str = "https://rube.app/mcp";
/// Gateway tool that ranks candidate tools for a free-text need.
pub(super) const DEFAULT_DISCOVER_TOOL: &str = "RUBE_SEARCH_TOOLS";
/// Gateway tool that executes a discovered tool by slug.
pub(super) const DEFAULT_EXECUTE_TOOL: &str = "RUBE_MULTI_EXECUTE_TOOL";
/// Per-request HTTP timeout for gateway calls.
pub(super) const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 60;

/// Model invocations allowed per exchange.
pub(super) const DEFAULT_MAX_ITERATIONS: usize = 5;
/// Wall-clock budget for one exchange, from the first model call.
pub(super) const DEFAULT_EXCHANGE_TIMEOUT_SECS: u64 = 300;
/// Largest accepted exchange budget (one day).
pub(super) const MAX_EXCHANGE_TIMEOUT_SECS: u64 = 86_400;
/// Tool description bound inside the model manifest.
pub(super) const DEFAULT_DESCRIPTION_MAX_CHARS: usize = 500;
/// Tool result bound before it re-enters the conversation.
pub(super) const DEFAULT_RESULT_MAX_CHARS: usize = 3000;
/// Tool step summary bound for UI display.
pub(super) const DEFAULT_SUMMARY_MAX_CHARS: usize = 200;

/// Default listen address.
pub(super) const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
/// Default listen port.
pub(super) const DEFAULT_SERVER_PORT: u16 = 3001;
/// Browser origins allowed by default (local UI dev servers).
pub(super) const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:5174",
    "http://localhost:5175",
    "http://localhost:3000",
];

/// Example configuration shipped with the crate.
pub(super) const CONFIG_TEMPLATE: &str = include_str!("../templates/officebot.toml");
