//! Unified error types for the orchestrator.

use std::fmt;

// ---------------------------------------------------------------------------
// TransportError
// ---------------------------------------------------------------------------

/// Network/HTTP failure talking to the model provider or the tool gateway.
#[derive(Debug)]
pub enum TransportError {
    /// reqwest-level error (connect, timeout, body read).
    Http(reqwest::Error),
    /// Non-2xx status from the remote service.
    Status { code: u16, body: String },
    /// The body could not be decoded into JSON.
    MalformedBody(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body } => write!(f, "status {code}: {body}"),
            Self::MalformedBody(msg) => write!(f, "malformed body: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl TransportError {
    /// True when the underlying HTTP client gave up waiting.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(inner) if inner.is_timeout())
    }
}

// ---------------------------------------------------------------------------
// GatewayError
// ---------------------------------------------------------------------------

/// Errors from the remote tool gateway.
#[derive(Debug)]
pub enum GatewayError {
    Transport(TransportError),
    /// The gateway answered with a structured error payload.
    Remote { code: Option<i64>, message: String },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Remote {
                code: Some(code),
                message,
            } => write!(f, "gateway error {code}: {message}"),
            Self::Remote {
                code: None,
                message,
            } => write!(f, "gateway error: {message}"),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<TransportError> for GatewayError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(TransportError::Http(e))
    }
}

impl GatewayError {
    /// Message text without the variant prefix, for tool-failure turns.
    pub fn message(&self) -> String {
        match self {
            Self::Transport(e) => e.to_string(),
            Self::Remote { message, .. } => message.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from a single model invocation.
#[derive(Debug)]
pub enum ApiError {
    Transport(TransportError),
    /// The provider answered 2xx but in a shape we cannot normalize.
    InvalidResponse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(TransportError::Http(e))
    }
}

impl ApiError {
    /// HTTP status code for provider status failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport(TransportError::Status { code, .. }) => Some(*code),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// AgentError
// ---------------------------------------------------------------------------

/// Fatal outcomes of one chat exchange.
#[derive(Debug)]
pub enum AgentError {
    /// The model call failed before any answer was available.
    Model(ApiError),
    /// The wall-clock budget for the exchange ran out.
    Timeout { secs: u64 },
    /// The request carried no usable conversation turns.
    EmptyHistory,
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(e) => write!(f, "model: {e}"),
            Self::Timeout { secs } => {
                write!(f, "agent execution timed out after {secs} seconds")
            }
            Self::EmptyHistory => write!(f, "conversation history is empty"),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<ApiError> for AgentError {
    fn from(e: ApiError) -> Self {
        Self::Model(e)
    }
}

impl AgentError {
    /// True for wall-clock exhaustion, as opposed to a failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// ---------------------------------------------------------------------------
// ServerError
// ---------------------------------------------------------------------------

/// Errors starting or running the HTTP surface.
#[derive(Debug)]
pub enum ServerError {
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },
    Serve(std::io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { addr, source } => {
                write!(f, "failed to bind HTTP listener on {addr}: {source}")
            }
            Self::Serve(e) => write!(f, "HTTP server error: {e}"),
        }
    }
}

impl std::error::Error for ServerError {}
