//! Data model for chat exchanges, tool manifests, and tool-step traces.
//!
//! Field names serialize in camelCase because these types cross the HTTP
//! boundary to the office UI unchanged.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Final text used when the model produced nothing usable.
pub const FALLBACK_RESPONSE: &str =
    "I processed your request but couldn't generate a text response.";

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// Conversation participant role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name shared by both model protocols.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single turn in the conversation history.
///
/// Order is conversation order and is replayed verbatim to the model on every
/// iteration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Loosely-typed history entry as sent by the UI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Value,
}

/// Normalize UI history into model-ready turns.
///
/// Anything that is not `user` is treated as `assistant`, content is trimmed,
/// and empty turns are dropped.
pub fn normalize_history(raw: &[RawTurn]) -> Vec<ConversationTurn> {
    raw.iter()
        .filter_map(|turn| {
            let content = match &turn.content {
                Value::String(text) => text.trim().to_string(),
                Value::Null => String::new(),
                other => other.to_string().trim().to_string(),
            };
            if content.is_empty() {
                return None;
            }
            let role = if turn.role == "user" {
                Role::User
            } else {
                Role::Assistant
            };
            Some(ConversationTurn { role, content })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// One tool offered to the model for the current exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    /// Gateway-native slug used for execution.
    pub name: String,
    /// Model-safe identifier derived from `name`.
    pub sanitized_name: String,
    /// Description bounded for manifest compactness.
    pub description: String,
    /// JSON Schema for the tool's arguments.
    pub input_schema: Value,
}

/// A tool invocation requested by the model, normalized across providers.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallIntent {
    pub id: String,
    /// Sanitized name as the model saw it.
    pub name: String,
    /// Arguments object; string-encoded provider arguments are parsed first.
    pub arguments: Value,
}

/// Canonical result of one model invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    /// Visible text with reasoning spans already removed.
    pub text: String,
    pub tool_calls: Vec<ToolCallIntent>,
}

// ---------------------------------------------------------------------------
// Tool steps and results
// ---------------------------------------------------------------------------

/// Execution status of a tool step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Only used on streamed `tool_call` events before the tool has run.
    Pending,
    Success,
    Error,
}

/// Audit entry for one tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToolStep {
    pub id: String,
    pub tool_name: String,
    pub action: String,
    pub status: StepStatus,
    pub summary: String,
    /// Unix milliseconds.
    pub timestamp: u64,
}

/// Outcome of one full chat exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationResult {
    pub final_text: String,
    /// Distinct executed tool names in first-use order.
    pub tools_used: Vec<String>,
    pub tool_steps: Vec<ToolStep>,
    pub session: Option<String>,
    /// Set when a later model call failed and a partial answer is returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupted: Option<String>,
}

/// Current wall-clock time in unix milliseconds.
pub fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Opaque id for a tool call the provider left unnamed.
pub fn generate_call_id() -> String {
    let mut bytes = [0u8; 8];
    OsRng.fill_bytes(&mut bytes);
    format!("call_{:016x}", u64::from_be_bytes(bytes))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
