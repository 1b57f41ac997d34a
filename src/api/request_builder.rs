//! Request payload construction for both wire protocols.

use super::ModelRequest;
use crate::types::ToolDescriptor;
use serde_json::{json, Value};

/// Body for an OpenAI-compatible `/chat/completions` request.
///
/// The system prompt travels as the first `system` message.
pub(super) fn build_completions_body(request: &ModelRequest) -> Value {
    let mut messages = Vec::with_capacity(request.turns.len() + 1);
    if !request.system.is_empty() {
        messages.push(json!({ "role": "system", "content": request.system }));
    }
    messages.extend(
        request
            .turns
            .iter()
            .map(|turn| json!({ "role": turn.role.as_str(), "content": turn.content })),
    );

    let mut body = json!({
        "model": request.model,
        "messages": messages,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    });
    if !request.tools.is_empty() {
        body["tools"] = Value::Array(request.tools.iter().map(function_tool).collect());
    }
    body
}

fn function_tool(tool: &ToolDescriptor) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.sanitized_name,
            "description": tool.description,
            "parameters": tool.input_schema,
        }
    })
}

/// Body for a content-block `/messages` request.
pub(super) fn build_messages_body(request: &ModelRequest) -> Value {
    let messages: Vec<Value> = request
        .turns
        .iter()
        .map(|turn| {
            json!({
                "role": turn.role.as_str(),
                "content": [{ "type": "text", "text": turn.content }],
            })
        })
        .collect();

    let mut body = json!({
        "model": request.model,
        "messages": messages,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    });
    if !request.system.is_empty() {
        body["system"] = json!(request.system);
    }
    if !request.tools.is_empty() {
        body["tools"] = Value::Array(
            request
                .tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.sanitized_name,
                        "description": tool.description,
                        "input_schema": tool.input_schema,
                    })
                })
                .collect(),
        );
    }
    body
}
