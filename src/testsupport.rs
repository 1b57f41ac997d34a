//! Shared test doubles for the gateway and model seams.
//!
//! Both doubles record every call so tests can assert on invocation counts
//! and on exactly what crossed each boundary.

use crate::api::{ModelClient, ModelRequest};
use crate::error::{ApiError, GatewayError};
use crate::gateway::{Discovery, RawToolSchema, ToolGateway};
use crate::types::{ModelReply, ToolCallIntent};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Scripted [`ToolGateway`] with per-slug canned results.
#[derive(Default)]
pub struct ScriptedGateway {
    tools: Vec<RawToolSchema>,
    session: Option<String>,
    discovery_error: Option<(Option<i64>, String)>,
    results: HashMap<String, Result<Value, (Option<i64>, String)>>,
    discover_log: StdMutex<Vec<(String, Option<String>)>>,
    execute_log: StdMutex<Vec<(String, Value, Option<String>)>>,
}

fn remote_parts(err: GatewayError) -> (Option<i64>, String) {
    match err {
        GatewayError::Remote { code, message } => (code, message),
        other => (None, other.message()),
    }
}

impl ScriptedGateway {
    pub fn with_tools(tools: Vec<RawToolSchema>) -> Self {
        Self {
            tools,
            ..Self::default()
        }
    }

    pub fn failing_discovery(err: GatewayError) -> Self {
        Self {
            discovery_error: Some(remote_parts(err)),
            ..Self::default()
        }
    }

    pub fn with_session(mut self, session: &str) -> Self {
        self.session = Some(session.to_string());
        self
    }

    pub fn with_result(mut self, slug: &str, result: Value) -> Self {
        self.results.insert(slug.to_string(), Ok(result));
        self
    }

    pub fn with_error(mut self, slug: &str, err: GatewayError) -> Self {
        self.results.insert(slug.to_string(), Err(remote_parts(err)));
        self
    }

    pub fn discover_queries(&self) -> Vec<String> {
        self.discover_log
            .lock()
            .unwrap()
            .iter()
            .map(|(query, _)| query.clone())
            .collect()
    }

    pub fn discover_count(&self) -> usize {
        self.discover_log.lock().unwrap().len()
    }

    pub fn executions(&self) -> Vec<(String, Value, Option<String>)> {
        self.execute_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolGateway for ScriptedGateway {
    async fn discover(
        &self,
        query: &str,
        session: Option<&str>,
    ) -> Result<Discovery, GatewayError> {
        self.discover_log
            .lock()
            .unwrap()
            .push((query.to_string(), session.map(str::to_string)));
        if let Some((code, message)) = &self.discovery_error {
            return Err(GatewayError::Remote {
                code: *code,
                message: message.clone(),
            });
        }
        Ok(Discovery {
            tools: self.tools.clone(),
            session: self
                .session
                .clone()
                .or_else(|| session.map(str::to_string)),
        })
    }

    async fn execute(
        &self,
        slug: &str,
        arguments: &Value,
        session: Option<&str>,
    ) -> Result<Value, GatewayError> {
        self.execute_log.lock().unwrap().push((
            slug.to_string(),
            arguments.clone(),
            session.map(str::to_string),
        ));
        match self.results.get(slug) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err((code, message))) => Err(GatewayError::Remote {
                code: *code,
                message: message.clone(),
            }),
            None => Err(GatewayError::Remote {
                code: None,
                message: format!("unknown tool {slug}"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Scripted [`ModelClient`] replaying queued replies in order.
///
/// When the queue runs dry the `fallback` reply (if any) repeats forever;
/// otherwise an invalid-response error is returned.
#[derive(Default)]
pub struct ScriptedModel {
    replies: StdMutex<VecDeque<Result<ModelReply, ApiError>>>,
    fallback: Option<ModelReply>,
    delay: Option<Duration>,
    requests: StdMutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<ModelReply, ApiError>>) -> Self {
        Self {
            replies: StdMutex::new(replies.into()),
            ..Self::default()
        }
    }

    /// Answer every invocation with the same reply.
    pub fn always(reply: ModelReply) -> Self {
        Self {
            fallback: Some(reply),
            ..Self::default()
        }
    }

    /// Sleep before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelReply, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(reply) => reply,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| ApiError::InvalidResponse("script exhausted".into())),
        }
    }
}

/// Plain text reply with no tool calls.
pub fn text_reply(text: &str) -> ModelReply {
    ModelReply {
        text: text.to_string(),
        tool_calls: Vec::new(),
    }
}

/// Reply proposing the given `(id, sanitized name, arguments)` calls.
pub fn tool_reply(text: &str, calls: &[(&str, &str, Value)]) -> ModelReply {
    ModelReply {
        text: text.to_string(),
        tool_calls: calls
            .iter()
            .map(|(id, name, arguments)| ToolCallIntent {
                id: id.to_string(),
                name: name.to_string(),
                arguments: arguments.clone(),
            })
            .collect(),
    }
}

/// Raw schema fixture.
pub fn raw_tool(slug: &str, description: &str) -> RawToolSchema {
    RawToolSchema {
        slug: slug.to_string(),
        description: description.to_string(),
        input_schema: None,
    }
}
