//! Tool execution against the remote gateway.
//!
//! Every call ends in a [`ToolOutcome`]. Gateway failures are values here,
//! not errors, because the orchestration loop feeds them back to the model
//! and keeps going.

use crate::gateway::ToolGateway;
use crate::textutil::{truncate_chars, truncate_with_ellipsis};
use crate::types::{now_unix_millis, StepStatus, ToolStep};
use serde_json::Value;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Stringified result, already bounded.
    Success { text: String },
    Failure { message: String },
}

impl ToolOutcome {
    pub fn status(&self) -> StepStatus {
        match self {
            Self::Success { .. } => StepStatus::Success,
            Self::Failure { .. } => StepStatus::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Conversation text fed back to the model.
    pub fn turn_text(&self, tool_name: &str) -> String {
        match self {
            Self::Success { text } => format!("Tool result for {tool_name}:\n{text}"),
            Self::Failure { message } => format!("Tool {tool_name} failed: {message}"),
        }
    }

    fn body(&self) -> &str {
        match self {
            Self::Success { text } => text,
            Self::Failure { message } => message,
        }
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Runs resolved tools and shapes their results.
#[derive(Debug, Clone, Copy)]
pub struct ToolExecutor {
    result_max_chars: usize,
    summary_max_chars: usize,
}

impl ToolExecutor {
    pub fn new(result_max_chars: usize, summary_max_chars: usize) -> Self {
        Self {
            result_max_chars,
            summary_max_chars,
        }
    }

    /// Execute `tool_name` (a gateway slug) and bound its result.
    pub async fn execute(
        &self,
        gateway: &dyn ToolGateway,
        tool_name: &str,
        arguments: &Value,
        session: Option<&str>,
    ) -> ToolOutcome {
        match gateway.execute(tool_name, arguments, session).await {
            Ok(result) => {
                let text = truncate_chars(&render_result(&result), self.result_max_chars);
                info!(tool = tool_name, chars = text.chars().count(), "tool succeeded");
                ToolOutcome::Success { text }
            }
            Err(err) => {
                warn!(tool = tool_name, error = %err, "tool failed");
                ToolOutcome::Failure {
                    message: err.message(),
                }
            }
        }
    }

    /// Audit entry for one finished call.
    pub fn record_step(
        &self,
        call_id: &str,
        tool_name: &str,
        arguments: &Value,
        outcome: &ToolOutcome,
    ) -> ToolStep {
        ToolStep {
            id: call_id.to_string(),
            tool_name: tool_name.to_string(),
            action: derive_action(tool_name, arguments),
            status: outcome.status(),
            summary: summarize(outcome.body(), self.summary_max_chars),
            timestamp: now_unix_millis(),
        }
    }

    /// Placeholder step announced before a call runs.
    pub fn pending_step(&self, call_id: &str, tool_name: &str, arguments: &Value) -> ToolStep {
        ToolStep {
            id: call_id.to_string(),
            tool_name: tool_name.to_string(),
            action: derive_action(tool_name, arguments),
            status: StepStatus::Pending,
            summary: String::new(),
            timestamp: now_unix_millis(),
        }
    }
}

/// Text form of a gateway result.
///
/// MCP results carry their payload as `content[].text`; those parts are
/// joined. Bare strings pass through. Anything else is compact JSON.
pub fn render_result(result: &Value) -> String {
    if let Some(parts) = result.get("content").and_then(Value::as_array) {
        let texts: Vec<&str> = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();
        if !texts.is_empty() {
            return texts.join("\n");
        }
    }
    match result {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Human-readable label for a tool step.
pub fn derive_action(tool_name: &str, arguments: &Value) -> String {
    let haystack = format!("{tool_name} {arguments}").to_ascii_lowercase();
    if haystack.contains("exa") || haystack.contains("search") {
        return "Researching with web tools".to_string();
    }
    if haystack.contains("notion") {
        return "Saving to Notion".to_string();
    }
    if haystack.contains("slack") {
        return "Notifying via Slack".to_string();
    }
    format!("Executing tool: {}", truncate_chars(tool_name, 60))
}

/// Bound step summaries for UI display.
pub fn summarize(text: &str, max_chars: usize) -> String {
    truncate_with_ellipsis(text, max_chars)
}
