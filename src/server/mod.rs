//! HTTP surface for the office UI.
//!
//! Routes:
//! - `POST /chat`: one exchange, JSON in and out
//! - `POST /chat/stream`: the same exchange as server-sent events
//! - `POST /mcp`: JSON-RPC passthrough to the tool gateway
//! - `GET /health`: liveness plus the configured endpoints

mod routes;

pub use routes::{router, ChatBody};

use crate::agent::Agent;
use crate::error::ServerError;
use crate::gateway::GatewayClient;
use axum::http::{HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Shared state handed to every handler.
pub struct AppState {
    agent: Arc<Agent>,
    gateway: Arc<GatewayClient>,
}

impl AppState {
    pub fn new(agent: Arc<Agent>, gateway: Arc<GatewayClient>) -> Self {
        Self { agent, gateway }
    }

    pub(crate) fn agent(&self) -> Arc<Agent> {
        Arc::clone(&self.agent)
    }

    pub(crate) fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }
}

/// CORS policy for the configured browser origins.
///
/// Origins that are not valid header values are skipped with a warning.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(
    state: Arc<AppState>,
    addr: SocketAddr,
    allowed_origins: &[String],
) -> Result<(), ServerError> {
    info!(%addr, "binding HTTP server");
    let app = router(state).layer(cors_layer(allowed_origins));

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "officebot ready: POST /chat, POST /chat/stream, POST /mcp, GET /health");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => {
            warn!(error = %err, "cannot listen for Ctrl-C; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
