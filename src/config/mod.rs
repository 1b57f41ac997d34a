//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`OFFICEBOT_*`, plus `PORT` for the listener)
//! 2. TOML file specified via --config CLI flag
//! 3. ./officebot.toml in the current directory
//! 4. $XDG_CONFIG_HOME/officebot/officebot.toml (or
//!    ~/.config/officebot/officebot.toml)
//! 5. Built-in defaults
//!
//! Secrets resolve separately: `OFFICEBOT_API_KEY` beats `model.api_key`,
//! which beats the variable named by `model.api_key_env`. The gateway token
//! follows the same shape with `OFFICEBOT_GATEWAY_TOKEN`.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

mod defaults;
mod types;

pub use types::{AgentConfig, ApiProtocol, Config, GatewayConfig, ModelConfig, ServerConfig};

/// Commented example config, suitable for `officebot.toml`.
pub fn config_template() -> &'static str {
    defaults::CONFIG_TEMPLATE
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Where the effective config text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Local,
    Global(PathBuf),
    BuiltInDefaults,
}

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    let (config, source) = load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )?;
    tracing::debug!(source = ?source, "configuration loaded");
    Ok(config)
}

fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<(Config, ConfigSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&config_text)?;
    apply_env_overrides_with(&mut config, &env_lookup)?;
    resolve_secrets_with(&mut config, &env_lookup);
    validate(&config)?;
    Ok((config, source))
}

fn read_config_text_with_sources<FRead, FRoot>(
    path_override: Option<&str>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<(String, ConfigSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    if let Some(p) = path_override {
        let path = PathBuf::from(p);
        let text = read_file(&path)?;
        return Ok((text, ConfigSource::Explicit(path)));
    }

    if let Ok(text) = read_file(Path::new("officebot.toml")) {
        return Ok((text, ConfigSource::Local));
    }
    if let Some(dir) = config_root() {
        let global = dir.join("officebot").join("officebot.toml");
        if let Ok(text) = read_file(&global) {
            return Ok((text, ConfigSource::Global(global)));
        }
    }

    Ok((String::new(), ConfigSource::BuiltInDefaults))
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

fn non_empty_env<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env_number<T, FEnv>(env_lookup: &FEnv, name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    FEnv: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty_env(env_lookup, name) else {
        return Ok(None);
    };
    raw.parse::<T>().map(Some).map_err(|_| {
        ConfigError::Invalid(format!(
            "invalid {name} value `{raw}`: expected a non-negative integer"
        ))
    })
}

/// Apply `OFFICEBOT_*` / `PORT` overrides on top of file values.
pub fn apply_env_overrides_with<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(url) = non_empty_env(env_lookup, "OFFICEBOT_BASE_URL") {
        config.model.base_url = url;
    }
    if let Some(model) = non_empty_env(env_lookup, "OFFICEBOT_MODEL") {
        config.model.model = model;
    }
    if let Some(raw) = non_empty_env(env_lookup, "OFFICEBOT_PROTOCOL") {
        config.model.protocol = ApiProtocol::parse(&raw).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "invalid OFFICEBOT_PROTOCOL value `{raw}`: expected `completions` or `messages`"
            ))
        })?;
    }
    if let Some(url) = non_empty_env(env_lookup, "OFFICEBOT_GATEWAY_URL") {
        config.gateway.url = url;
    }
    if let Some(n) = parse_env_number::<usize, _>(env_lookup, "OFFICEBOT_MAX_ITERATIONS")? {
        config.agent.max_iterations = n;
    }
    if let Some(secs) = parse_env_number::<u64, _>(env_lookup, "OFFICEBOT_TIMEOUT_SECS")? {
        config.agent.exchange_timeout_secs = secs.max(1);
    }
    if let Some(host) = non_empty_env(env_lookup, "OFFICEBOT_HOST") {
        config.server.host = host;
    }
    let port = match parse_env_number::<u16, _>(env_lookup, "OFFICEBOT_PORT")? {
        Some(port) => Some(port),
        None => parse_env_number::<u16, _>(env_lookup, "PORT")?,
    };
    if let Some(port) = port {
        config.server.port = port;
    }
    Ok(())
}

fn resolve_secrets_with<FEnv>(config: &mut Config, env_lookup: &FEnv)
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(key) = non_empty_env(env_lookup, "OFFICEBOT_API_KEY") {
        config.model.api_key = key;
    } else if config.model.api_key.trim().is_empty() {
        if let Some(name) = config.model.api_key_env.as_deref() {
            config.model.api_key = non_empty_env(env_lookup, name).unwrap_or_default();
        }
    }

    if let Some(token) = non_empty_env(env_lookup, "OFFICEBOT_GATEWAY_TOKEN") {
        config.gateway.token = token;
    } else if config.gateway.token.trim().is_empty() {
        if let Some(name) = config.gateway.token_env.as_deref() {
            config.gateway.token = non_empty_env(env_lookup, name).unwrap_or_default();
        }
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.agent.max_iterations == 0 {
        return Err(ConfigError::Invalid(
            "agent.max_iterations must be at least 1".into(),
        ));
    }
    if config.agent.exchange_timeout_secs == 0
        || config.agent.exchange_timeout_secs > defaults::MAX_EXCHANGE_TIMEOUT_SECS
    {
        return Err(ConfigError::Invalid(format!(
            "agent.exchange_timeout_secs must be between 1 and {}",
            defaults::MAX_EXCHANGE_TIMEOUT_SECS
        )));
    }
    if config.model.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("model.base_url must not be empty".into()));
    }
    if config.model.model.trim().is_empty() {
        return Err(ConfigError::Invalid("model.model must not be empty".into()));
    }
    Ok(())
}

/// Base directory for the global config file.
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
