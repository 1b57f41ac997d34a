//! Exchange progress events.
//!
//! The streaming path pushes these onto an unbounded channel as they happen;
//! the HTTP layer turns each into one SSE frame named by [`ExchangeEvent::name`].

use crate::types::{OrchestrationResult, ToolStep};
use serde_json::{json, Value};
use tokio::sync::mpsc;

/// One observable moment in a chat exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeEvent {
    Status { message: String },
    /// A tool call was proposed; the step is still `pending`.
    ToolCall(ToolStep),
    /// The tool finished with `success` or `error`.
    ToolResult(ToolStep),
    Done(OrchestrationResult),
    Error { message: String, timeout: bool },
}

impl ExchangeEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::ToolCall(_) => "tool_call",
            Self::ToolResult(_) => "tool_result",
            Self::Done(_) => "done",
            Self::Error { .. } => "error",
        }
    }

    /// SSE `data:` payload.
    pub fn data(&self) -> Value {
        match self {
            Self::Status { message } => json!({ "message": message }),
            Self::ToolCall(step) | Self::ToolResult(step) => {
                serde_json::to_value(step).unwrap_or(Value::Null)
            }
            Self::Done(result) => response_payload(result),
            Self::Error { message, timeout } => json!({ "error": message, "timeout": timeout }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Error { .. })
    }
}

/// UI-facing body for a finished exchange.
///
/// Empty lists and a missing session are omitted, matching what the office
/// UI expects from both `/chat` and the streamed `done` event.
pub fn response_payload(result: &OrchestrationResult) -> Value {
    let mut body = json!({ "response": result.final_text });
    if !result.tools_used.is_empty() {
        body["toolsUsed"] = json!(result.tools_used);
    }
    if !result.tool_steps.is_empty() {
        body["toolSteps"] = serde_json::to_value(&result.tool_steps).unwrap_or(Value::Null);
    }
    if let Some(session) = &result.session {
        body["sessionId"] = json!(session);
    }
    if let Some(reason) = &result.interrupted {
        body["interrupted"] = json!(reason);
    }
    body
}

/// Optional event sink threaded through the loop.
#[derive(Clone, Copy)]
pub(super) struct EventSink<'a>(pub(super) Option<&'a mpsc::UnboundedSender<ExchangeEvent>>);

impl EventSink<'_> {
    /// Send an event. A closed receiver (client went away) is not an error.
    pub(super) fn emit(&self, event: ExchangeEvent) {
        if let Some(tx) = self.0 {
            let _ = tx.send(event);
        }
    }

    pub(super) fn status(&self, message: impl Into<String>) {
        self.emit(ExchangeEvent::Status {
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StepStatus;

    fn result() -> OrchestrationResult {
        OrchestrationResult {
            final_text: "done".into(),
            tools_used: Vec::new(),
            tool_steps: Vec::new(),
            session: None,
            interrupted: None,
        }
    }

    #[test]
    fn payload_omits_empty_fields() {
        let body = response_payload(&result());
        assert_eq!(body, json!({ "response": "done" }));
    }

    #[test]
    fn payload_carries_tools_and_session() {
        let mut r = result();
        r.tools_used = vec!["EXA_SEARCH".into()];
        r.tool_steps = vec![ToolStep {
            id: "c1".into(),
            tool_name: "EXA_SEARCH".into(),
            action: "Researching with web tools".into(),
            status: StepStatus::Success,
            summary: "42".into(),
            timestamp: 1,
        }];
        r.session = Some("s-1".into());
        let body = response_payload(&r);
        assert_eq!(body["toolsUsed"], json!(["EXA_SEARCH"]));
        assert_eq!(body["toolSteps"][0]["toolName"], "EXA_SEARCH");
        assert_eq!(body["sessionId"], "s-1");
    }

    #[test]
    fn event_names_match_sse_contract() {
        let step = ToolStep {
            id: "c".into(),
            tool_name: "t".into(),
            action: "a".into(),
            status: StepStatus::Pending,
            summary: String::new(),
            timestamp: 0,
        };
        let events = [
            ExchangeEvent::Status {
                message: "x".into(),
            },
            ExchangeEvent::ToolCall(step.clone()),
            ExchangeEvent::ToolResult(step),
            ExchangeEvent::Done(result()),
            ExchangeEvent::Error {
                message: "boom".into(),
                timeout: false,
            },
        ];
        let names: Vec<_> = events.iter().map(ExchangeEvent::name).collect();
        assert_eq!(names, ["status", "tool_call", "tool_result", "done", "error"]);
        assert_eq!(events[1].data()["status"], "pending");
        assert_eq!(events[4].data()["error"], "boom");
        assert!(events[3].is_terminal() && events[4].is_terminal());
        assert!(!events[0].is_terminal());
    }
}
