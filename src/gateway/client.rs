//! JSON-RPC client for the remote tool gateway.

use super::envelope::decode_body;
use super::{Discovery, RawToolSchema, ToolGateway};
use crate::api::build_http_client;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, TransportError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

const ACCEPT: &str = "application/json, text/event-stream";

/// HTTP client for an MCP-style tool gateway.
pub struct GatewayClient {
    http: reqwest::Client,
    url: String,
    token: String,
    discover_tool: String,
    execute_tool: String,
    next_id: AtomicU64,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            http: build_http_client(Duration::from_secs(config.timeout_secs.max(1))),
            url: config.url.clone(),
            token: config.token.trim().to_string(),
            discover_tool: config.discover_tool.clone(),
            execute_tool: config.execute_tool.clone(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one JSON-RPC request and return its `result`.
    ///
    /// No retries. An `error` object in the body becomes
    /// [`GatewayError::Remote`]; everything else that goes wrong on the way
    /// is a [`GatewayError::Transport`].
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, GatewayError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "gateway request");

        let mut req = self
            .http
            .post(&self.url)
            .header("Accept", ACCEPT)
            .json(&body);
        if !self.token.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.token));
        }

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(TransportError::Status {
                code: status.as_u16(),
                body: text,
            }
            .into());
        }

        let mut data = decode_body(&text)?;
        if let Some(error) = data.get("error").filter(|e| !e.is_null()) {
            return Err(remote_error(error));
        }
        Ok(data.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }
}

fn remote_error(error: &Value) -> GatewayError {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
        .or_else(|| error.as_str().map(str::to_string))
        .unwrap_or_else(|| "MCP error".to_string());
    GatewayError::Remote {
        code: error.get("code").and_then(Value::as_i64),
        message,
    }
}

#[async_trait]
impl ToolGateway for GatewayClient {
    async fn discover(
        &self,
        query: &str,
        session: Option<&str>,
    ) -> Result<Discovery, GatewayError> {
        let session_arg = match session {
            Some(id) => json!({ "id": id }),
            None => json!({ "generate_id": true }),
        };
        let result = self
            .call(
                "tools/call",
                json!({
                    "name": self.discover_tool,
                    "arguments": {
                        "queries": [{ "use_case": query, "known_fields": "" }],
                        "session": session_arg,
                    },
                }),
            )
            .await?;
        let discovery = parse_discovery(&result, session);
        debug!(
            tools = discovery.tools.len(),
            session = discovery.session.as_deref().unwrap_or(""),
            "gateway discovery complete"
        );
        Ok(discovery)
    }

    async fn execute(
        &self,
        slug: &str,
        arguments: &Value,
        session: Option<&str>,
    ) -> Result<Value, GatewayError> {
        let mut args = json!({
            "tools": [{ "tool_slug": slug, "arguments": arguments }],
            "sync_response_to_workbench": false,
            "memory": {},
        });
        if let Some(id) = session {
            args["session_id"] = json!(id);
        }
        let result = self
            .call(
                "tools/call",
                json!({ "name": self.execute_tool, "arguments": args }),
            )
            .await?;

        if result.get("isError").and_then(Value::as_bool) == Some(true) {
            let message = first_text_content(&result)
                .map(str::to_string)
                .unwrap_or_else(|| format!("tool {slug} reported an error"));
            warn!(tool = slug, "gateway reported tool error");
            return Err(GatewayError::Remote {
                code: None,
                message,
            });
        }
        Ok(result)
    }
}

fn first_text_content(result: &Value) -> Option<&str> {
    result
        .get("content")?
        .get(0)?
        .get("text")?
        .as_str()
        .filter(|text| !text.trim().is_empty())
}

/// Extract tool schemas and the session from a discovery result.
///
/// The gateway nests the interesting part as JSON text inside
/// `content[0].text`, under `data.data.results[0]`. Anything missing or
/// malformed yields an empty tool list; the session falls back to
/// `prior_session`.
pub fn parse_discovery(result: &Value, prior_session: Option<&str>) -> Discovery {
    let prior = prior_session
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let Some(text) = first_text_content(result) else {
        return Discovery {
            tools: Vec::new(),
            session: prior,
        };
    };
    let Ok(parsed) = serde_json::from_str::<Value>(text) else {
        warn!("discovery payload is not JSON");
        return Discovery {
            tools: Vec::new(),
            session: prior,
        };
    };
    let inner = parsed
        .pointer("/data/data/results/0")
        .cloned()
        .unwrap_or(Value::Null);

    let session = inner
        .pointer("/session/id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or(prior);

    let tools = inner
        .get("tool_schemas")
        .and_then(Value::as_object)
        .map(|schemas| {
            schemas
                .iter()
                .map(|(slug, schema)| RawToolSchema {
                    slug: slug.clone(),
                    description: schema
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    input_schema: schema
                        .get("input_schema")
                        .filter(|s| s.is_object())
                        .cloned(),
                })
                .collect()
        })
        .unwrap_or_default();

    Discovery { tools, session }
}
