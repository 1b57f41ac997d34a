//! Provider response decoding.
//!
//! Replies are decoded by detected shape, not by the protocol the request
//! used, so an OpenAI-compatible gateway in front of a content-block model
//! (or the reverse) still normalizes. Each [`ResponseShape`] has its own
//! decoder feeding one canonical [`ModelReply`].

use crate::error::ApiError;
use crate::textutil::strip_reasoning;
use crate::types::{generate_call_id, ModelReply, ToolCallIntent};
use serde_json::{Map, Value};

/// Known provider reply layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `choices[0].message` with string content and `tool_calls`.
    Choices,
    /// Top-level `content` array of `text` / `tool_use` blocks.
    ContentBlocks,
}

impl ResponseShape {
    /// Detect the layout of a provider payload.
    pub fn detect(payload: &Value) -> Option<Self> {
        if payload
            .get("choices")
            .and_then(Value::as_array)
            .is_some_and(|choices| !choices.is_empty())
        {
            return Some(Self::Choices);
        }
        if payload.get("content").and_then(Value::as_array).is_some() {
            return Some(Self::ContentBlocks);
        }
        None
    }

    fn decode(self, payload: &Value) -> Result<ModelReply, ApiError> {
        match self {
            Self::Choices => decode_choices(payload),
            Self::ContentBlocks => decode_content_blocks(payload),
        }
    }
}

/// Normalize any supported provider payload.
pub fn parse_model_reply(payload: &Value) -> Result<ModelReply, ApiError> {
    if let Some(message) = payload
        .get("error")
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(Value::as_str)
    {
        return Err(ApiError::InvalidResponse(format!(
            "provider error: {message}"
        )));
    }
    let Some(shape) = ResponseShape::detect(payload) else {
        return Err(ApiError::InvalidResponse(
            "response has neither `choices` nor `content`".into(),
        ));
    };
    shape.decode(payload)
}

fn decode_choices(payload: &Value) -> Result<ModelReply, ApiError> {
    let message = payload
        .pointer("/choices/0/message")
        .ok_or_else(|| ApiError::InvalidResponse("choices[0] has no message".into()))?;

    let raw_text = match message.get("content") {
        Some(Value::String(text)) => text.clone(),
        // Some compatible servers send content parts instead of a string.
        Some(Value::Array(parts)) => collect_text_parts(parts),
        _ => String::new(),
    };

    let tool_calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| calls.iter().filter_map(choices_tool_call).collect())
        .unwrap_or_default();

    Ok(ModelReply {
        text: strip_reasoning(&raw_text),
        tool_calls,
    })
}

fn choices_tool_call(call: &Value) -> Option<ToolCallIntent> {
    let function = call.get("function")?;
    let name = function.get("name").and_then(Value::as_str)?.trim();
    if name.is_empty() {
        return None;
    }
    let arguments = match function.get("arguments") {
        Some(Value::String(raw)) => parse_arguments(raw),
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => empty_arguments(),
    };
    Some(ToolCallIntent {
        id: call_id(call.get("id")),
        name: name.to_string(),
        arguments,
    })
}

fn decode_content_blocks(payload: &Value) -> Result<ModelReply, ApiError> {
    let blocks = payload
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::InvalidResponse("content is not an array".into()))?;

    let mut texts = Vec::<&str>::new();
    let mut tool_calls = Vec::new();
    for block in blocks {
        match block.get("type").and_then(Value::as_str) {
            Some("text") => {
                if let Some(text) = block.get("text").and_then(Value::as_str) {
                    texts.push(text);
                }
            }
            Some("tool_use") => {
                let Some(name) = block
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                else {
                    continue;
                };
                let arguments = match block.get("input") {
                    Some(Value::Object(map)) => Value::Object(map.clone()),
                    Some(Value::String(raw)) => parse_arguments(raw),
                    _ => empty_arguments(),
                };
                tool_calls.push(ToolCallIntent {
                    id: call_id(block.get("id")),
                    name: name.to_string(),
                    arguments,
                });
            }
            _ => {}
        }
    }

    Ok(ModelReply {
        text: strip_reasoning(&texts.join("\n")),
        tool_calls,
    })
}

fn collect_text_parts(parts: &[Value]) -> String {
    parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse string-encoded arguments; anything but a JSON object becomes `{}`.
fn parse_arguments(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Object(map)) => Value::Object(map),
        _ => empty_arguments(),
    }
}

fn empty_arguments() -> Value {
    Value::Object(Map::new())
}

fn call_id(raw: Option<&Value>) -> String {
    raw.and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_call_id)
}
