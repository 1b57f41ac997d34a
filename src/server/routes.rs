//! Route handlers.

use super::AppState;
use crate::agent::{response_payload, ExchangeEvent, ExchangeRequest};
use crate::error::AgentError;
use crate::persona::Persona;
use crate::types::{normalize_history, now_unix_millis, RawTurn};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};

/// User-facing text when an exchange fails outright.
const APOLOGY: &str = "Sorry, I had trouble processing that request.";
/// JSON-RPC internal error code.
const RPC_INTERNAL_ERROR: i64 = -32603;

/// Build the application router without CORS.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/chat/stream", post(chat_stream_handler))
        .route("/mcp", post(mcp_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Chat request body as the office UI sends it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatBody {
    pub agent_name: Option<String>,
    pub role: Option<String>,
    pub personality: Option<String>,
    pub messages: Vec<RawTurn>,
    pub enable_tools: bool,
    pub session_id: Option<String>,
    pub is_task_execution: bool,
}

impl ChatBody {
    pub fn into_exchange(self) -> ExchangeRequest {
        ExchangeRequest {
            persona: Persona::new(
                self.agent_name.as_deref(),
                self.role.as_deref(),
                self.personality.as_deref(),
            ),
            history: normalize_history(&self.messages),
            tools_enabled: self.enable_tools,
            session: self.session_id.filter(|s| !s.trim().is_empty()),
            task_execution: self.is_task_execution,
        }
    }
}

// ---------------------------------------------------------------------------
// /chat
// ---------------------------------------------------------------------------

async fn chat_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let Json(body) = body.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected chat body");
        (
            rejection.status(),
            Json(json!({ "error": rejection.body_text(), "response": APOLOGY })),
        )
    })?;
    let request = body.into_exchange();
    info!(
        agent = %request.persona.name,
        tools = request.tools_enabled,
        task = request.task_execution,
        "chat request"
    );
    match state.agent().run(request).await {
        Ok(result) => Ok(Json(response_payload(&result))),
        Err(err) => {
            error!(error = %err, "chat request failed");
            Err((
                status_for(&err),
                Json(json!({ "error": err.to_string(), "response": APOLOGY })),
            ))
        }
    }
}

fn status_for(err: &AgentError) -> StatusCode {
    match err {
        AgentError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        AgentError::EmptyHistory => StatusCode::BAD_REQUEST,
        AgentError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ---------------------------------------------------------------------------
// /chat/stream
// ---------------------------------------------------------------------------

/// Aborts the exchange task when the SSE stream is dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn chat_stream_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(body)) => body.into_exchange(),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected chat stream body");
            let event = ExchangeEvent::Error {
                message: rejection.body_text(),
                timeout: false,
            };
            let once = tokio_stream::once(Ok::<_, Infallible>(sse_event(&event)));
            return Sse::new(once).into_response();
        }
    };
    info!(agent = %request.persona.name, tools = request.tools_enabled, "chat stream request");

    let (tx, rx) = mpsc::unbounded_channel::<ExchangeEvent>();
    let agent = state.agent();
    let task = tokio::spawn(async move {
        if let Err(err) = agent.run_streaming(request, &tx).await {
            error!(error = %err, "chat stream failed");
        }
    });
    let guard = AbortOnDrop(task);

    let stream = UnboundedReceiverStream::new(rx).map(move |event| {
        let _keep = &guard;
        Ok::<_, Infallible>(sse_event(&event))
    });
    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
        .into_response()
}

fn sse_event(event: &ExchangeEvent) -> Event {
    Event::default()
        .event(event.name())
        .data(event.data().to_string())
}

// ---------------------------------------------------------------------------
// /mcp
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RpcBody {
    method: String,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    id: Value,
}

async fn mcp_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RpcBody>,
) -> (StatusCode, Json<Value>) {
    let id = if body.id.is_null() {
        json!(now_unix_millis())
    } else {
        body.id
    };
    info!(method = %body.method, "mcp passthrough");
    match state.gateway().call(&body.method, body.params).await {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({ "jsonrpc": "2.0", "id": id, "result": result })),
        ),
        Err(err) => {
            error!(error = %err, "mcp passthrough failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": RPC_INTERNAL_ERROR, "message": err.to_string() },
                })),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// /health
// ---------------------------------------------------------------------------

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "mcp": state.gateway().url(),
        "model": state.agent().model_id(),
        "runtime": concat!("officebot/", env!("CARGO_PKG_VERSION")),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::config::{AgentConfig, GatewayConfig};
    use crate::error::ApiError;
    use crate::gateway::GatewayClient;
    use crate::testsupport::{raw_tool, text_reply, tool_reply, ScriptedGateway, ScriptedModel};
    use tokio::net::TcpListener;

    async fn spawn_app(model: ScriptedModel, gateway: ScriptedGateway, gateway_url: &str) -> String {
        let agent = Agent::new(
            Arc::new(model),
            Arc::new(gateway),
            AgentConfig::default(),
        );
        let client = GatewayClient::new(&GatewayConfig {
            url: gateway_url.to_string(),
            ..GatewayConfig::default()
        });
        let state = Arc::new(AppState::new(Arc::new(agent), Arc::new(client)));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn chat_body_accepts_ui_field_names() {
        let body: ChatBody = serde_json::from_value(json!({
            "agentName": "Ada",
            "role": "writer",
            "messages": [{ "role": "user", "content": "hi" }, { "role": "agent", "content": "" }],
            "enableTools": true,
            "sessionId": "  ",
            "isTaskExecution": true
        }))
        .unwrap();
        let request = body.into_exchange();
        assert_eq!(request.persona.name, "Ada");
        assert_eq!(request.persona.personality, "focused");
        assert_eq!(request.history.len(), 1);
        assert!(request.tools_enabled && request.task_execution);
        assert_eq!(request.session, None);
    }

    #[tokio::test]
    async fn chat_returns_ui_payload() {
        let base = spawn_app(
            ScriptedModel::new(vec![Ok(text_reply("Hello there"))]),
            ScriptedGateway::default(),
            "http://127.0.0.1:9",
        )
        .await;
        let resp = reqwest::Client::new()
            .post(format!("{base}/chat"))
            .json(&json!({ "agentName": "Ada", "messages": [{ "role": "user", "content": "hello" }] }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "response": "Hello there" }));
    }

    #[tokio::test]
    async fn chat_failure_returns_apology() {
        let base = spawn_app(
            ScriptedModel::new(vec![Err(ApiError::InvalidResponse("boom".into()))]),
            ScriptedGateway::default(),
            "http://127.0.0.1:9",
        )
        .await;
        let resp = reqwest::Client::new()
            .post(format!("{base}/chat"))
            .json(&json!({ "messages": [{ "role": "user", "content": "hello" }] }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 500);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["response"], APOLOGY);
        assert!(body["error"].as_str().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn empty_history_is_a_bad_request() {
        let base = spawn_app(
            ScriptedModel::new(Vec::new()),
            ScriptedGateway::default(),
            "http://127.0.0.1:9",
        )
        .await;
        let resp = reqwest::Client::new()
            .post(format!("{base}/chat"))
            .json(&json!({ "messages": [] }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn stream_emits_named_events_in_order() {
        let base = spawn_app(
            ScriptedModel::new(vec![
                Ok(tool_reply("", &[("c1", "search", json!({ "q": "x" }))])),
                Ok(text_reply("42 it is")),
            ]),
            ScriptedGateway::with_tools(vec![raw_tool("search", "")])
                .with_result("search", json!("42")),
            "http://127.0.0.1:9",
        )
        .await;
        let text = reqwest::Client::new()
            .post(format!("{base}/chat/stream"))
            .json(&json!({ "messages": [{ "role": "user", "content": "x?" }], "enableTools": true }))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        let names: Vec<&str> = text
            .lines()
            .filter_map(|line| line.strip_prefix("event: "))
            .filter(|name| *name != "status")
            .collect();
        assert_eq!(names, ["tool_call", "tool_result", "done"]);
        assert!(text.contains("\"response\":\"42 it is\""), "got: {text}");
    }

    // Verifies malformed bodies keep the UI error shape on both chat routes.
    #[tokio::test]
    async fn malformed_bodies_get_structured_errors() {
        let base = spawn_app(
            ScriptedModel::new(Vec::new()),
            ScriptedGateway::default(),
            "http://127.0.0.1:9",
        )
        .await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{base}/chat"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["response"], APOLOGY);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));

        let resp = client
            .post(format!("{base}/chat"))
            .body(r#"{"messages":[]}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 415);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["response"], APOLOGY);

        let text = client
            .post(format!("{base}/chat/stream"))
            .header("content-type", "application/json")
            .body(r#"{"messages": "nope"}"#)
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        let names: Vec<&str> = text
            .lines()
            .filter_map(|line| line.strip_prefix("event: "))
            .collect();
        assert_eq!(names, ["error"]);
        assert!(text.contains("\"timeout\":false"), "got: {text}");
    }

    #[tokio::test]
    async fn health_reports_endpoints() {
        let base = spawn_app(
            ScriptedModel::new(Vec::new()),
            ScriptedGateway::default(),
            "http://gateway.test/mcp",
        )
        .await;
        let body: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["mcp"], "http://gateway.test/mcp");
        assert!(body["runtime"].as_str().unwrap().starts_with("officebot/"));
    }

    #[tokio::test]
    async fn mcp_failure_maps_to_internal_rpc_error() {
        // Nothing listens on the discard port, so the forward fails.
        let base = spawn_app(
            ScriptedModel::new(Vec::new()),
            ScriptedGateway::default(),
            "http://127.0.0.1:9/mcp",
        )
        .await;
        let resp = reqwest::Client::new()
            .post(format!("{base}/mcp"))
            .json(&json!({ "method": "tools/list", "id": 7 }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 500);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["id"], 7);
        assert_eq!(body["error"]["code"], -32603);
    }
}
