//! Response-body decoding for the tool gateway.
//!
//! Streamable-HTTP gateways may answer a plain JSON-RPC request with an SSE
//! framed body (`event: message\ndata: {...}\n\n`). Both forms decode to the
//! same JSON value here.

use crate::error::TransportError;
use serde_json::Value;

/// Decode a gateway body, unwrapping `data:` framing when present.
pub fn decode_body(body: &str) -> Result<Value, TransportError> {
    if !has_data_lines(body) {
        return parse_json(body.trim());
    }

    let mut last_parsed = None;
    for payload in parse_sse_event_payloads(body) {
        let Ok(value) = serde_json::from_str::<Value>(payload.trim()) else {
            continue;
        };
        if is_rpc_response(&value) {
            return Ok(value);
        }
        last_parsed = Some(value);
    }
    match last_parsed {
        Some(value) => Ok(value),
        None => Err(TransportError::MalformedBody(format!(
            "no JSON payload in event-stream body: {}",
            preview(body)
        ))),
    }
}

fn has_data_lines(body: &str) -> bool {
    body.lines().any(|line| line.trim_start().starts_with("data:"))
}

fn is_rpc_response(value: &Value) -> bool {
    value.get("result").is_some() || value.get("error").is_some()
}

fn parse_json(text: &str) -> Result<Value, TransportError> {
    serde_json::from_str(text).map_err(|e| {
        TransportError::MalformedBody(format!("{e}; body: {}", preview(text)))
    })
}

fn preview(text: &str) -> String {
    crate::textutil::truncate_with_ellipsis(text.trim(), 200)
}

/// Split an SSE body into per-event payloads, joining multi-line `data:`.
fn parse_sse_event_payloads(stream: &str) -> Vec<String> {
    let mut payloads = Vec::new();
    let mut data_lines = Vec::<String>::new();

    let mut flush_event = |lines: &mut Vec<String>| {
        if lines.is_empty() {
            return;
        }
        payloads.push(lines.join("\n"));
        lines.clear();
    };

    for raw_line in stream.lines() {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        if line.is_empty() {
            flush_event(&mut data_lines);
            continue;
        }
        if line.starts_with(':') {
            continue;
        }

        let (field, value) = if let Some((field, value)) = line.split_once(':') {
            (field, value.trim_start())
        } else {
            (line, "")
        };
        if field.trim() == "data" {
            data_lines.push(value.to_string());
        }
    }
    flush_event(&mut data_lines);
    payloads
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enveloped_and_bare_bodies_decode_identically() {
        let bare = decode_body(r#"{"result": {"ok": true}}"#).unwrap();
        let wrapped = decode_body("data: {\"result\": {\"ok\": true}}\n\n").unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(wrapped, json!({"result": {"ok": true}}));
    }

    #[test]
    fn event_stream_with_event_and_id_fields() {
        let body = "event: message\r\nid: 7\r\ndata: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\r\n\r\n";
        let value = decode_body(body).unwrap();
        assert_eq!(value["id"], 1);
    }

    #[test]
    fn multi_line_data_is_joined_before_parsing() {
        let body = "data: {\"result\":\ndata:   {\"n\": 3}}\n\n";
        assert_eq!(decode_body(body).unwrap()["result"]["n"], 3);
    }

    #[test]
    fn notifications_before_the_response_are_skipped() {
        let body = ": keep-alive\n\n\
                    data: {\"method\":\"notifications/progress\"}\n\n\
                    data: {\"result\":{\"done\":true}}\n\n";
        assert_eq!(decode_body(body).unwrap()["result"]["done"], true);
    }

    #[test]
    fn error_payload_counts_as_a_response() {
        let body = "data: {\"error\":{\"code\":-32601,\"message\":\"nope\"}}\n\n";
        assert_eq!(decode_body(body).unwrap()["error"]["code"], -32601);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            decode_body("<html>bad gateway</html>"),
            Err(TransportError::MalformedBody(_))
        ));
        assert!(matches!(
            decode_body("data: not json\n\n"),
            Err(TransportError::MalformedBody(_))
        ));
    }

    #[test]
    fn sse_payloads_skip_comments_and_flush_on_blank_lines() {
        let payloads = parse_sse_event_payloads(": ping\ndata: one\ndata: two\n\ndata: three\n");
        assert_eq!(payloads, vec!["one\ntwo".to_string(), "three".to_string()]);
    }
}
