//! Scripted HTTP endpoints for end-to-end exchange tests.
//!
//! Each [`FakeEndpoint`] accepts connections on an ephemeral port, records the
//! raw request, and answers from a queue of canned responses. Once the queue
//! is down to one response it repeats that response forever.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One canned HTTP response.
#[derive(Clone)]
pub struct Canned {
    pub status: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl Canned {
    pub fn json(body: Value) -> Self {
        Self {
            status: "200 OK",
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn sse(body: Value) -> Self {
        Self {
            status: "200 OK",
            content_type: "text/event-stream",
            body: format!("event: message\ndata: {body}\n\n"),
        }
    }

    pub fn status(status: &'static str, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.to_string(),
        }
    }
}

/// A captured request: header block and parsed JSON body.
#[derive(Clone, Debug)]
pub struct Captured {
    pub head: String,
    pub body: Value,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

pub struct FakeEndpoint {
    pub url: String,
    captured: Arc<StdMutex<Vec<Captured>>>,
}

impl FakeEndpoint {
    pub async fn start(responses: Vec<Canned>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let captured = Arc::new(StdMutex::new(Vec::new()));
        let queue = Arc::new(StdMutex::new(VecDeque::from(responses)));

        let log = Arc::clone(&captured);
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let raw = read_request(&mut stream).await;
                log.lock().unwrap().push(split_request(&raw));

                let next = {
                    let mut queue = queue.lock().unwrap();
                    if queue.len() > 1 {
                        queue.pop_front()
                    } else {
                        queue.front().cloned()
                    }
                };
                let canned = next.unwrap_or_else(|| Canned::status("500 Internal Server Error", "no script"));
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    canned.status,
                    canned.content_type,
                    canned.body.len(),
                    canned.body
                );
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });

        Self {
            url: format!("http://{addr}"),
            captured,
        }
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.captured.lock().unwrap().len()
    }
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn split_request(raw: &str) -> Captured {
    let (head, body) = raw.split_once("\r\n\r\n").unwrap_or((raw, ""));
    Captured {
        head: head.to_string(),
        body: serde_json::from_str(body).unwrap_or(Value::Null),
    }
}

// ---------------------------------------------------------------------------
// Payload builders
// ---------------------------------------------------------------------------

/// A `messages`-protocol reply with plain text.
pub fn text_message(text: &str) -> Canned {
    Canned::json(json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn"
    }))
}

/// A `messages`-protocol reply proposing one tool call.
pub fn tool_use_message(id: &str, name: &str, input: Value) -> Canned {
    Canned::json(json!({
        "id": "msg_2",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "tool_use", "id": id, "name": name, "input": input }],
        "stop_reason": "tool_use"
    }))
}

/// JSON-RPC success wrapping MCP text content.
pub fn rpc_text(text: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": { "content": [{ "type": "text", "text": text }] }
    })
}

/// Gateway discovery result listing `slugs` under `session`.
pub fn discovery(session: &str, slugs: &[(&str, &str)]) -> Value {
    let schemas: serde_json::Map<String, Value> = slugs
        .iter()
        .map(|(slug, description)| {
            (
                slug.to_string(),
                json!({
                    "description": description,
                    "input_schema": { "type": "object", "properties": { "query": { "type": "string" } } }
                }),
            )
        })
        .collect();
    let payload = json!({
        "data": { "data": { "results": [{
            "session": { "id": session },
            "tool_schemas": schemas
        }]}}
    });
    rpc_text(&payload.to_string())
}
