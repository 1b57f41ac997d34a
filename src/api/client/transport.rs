//! HTTP transport helpers for protocol-specific model requests.

use crate::api::request_builder::{build_completions_body, build_messages_body};
use crate::api::ModelRequest;
use crate::config::ApiProtocol;
use crate::error::{ApiError, TransportError};
use serde_json::Value;
use std::time::Duration;

/// Header value required by content-block `/messages` endpoints.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Build an HTTP client with timeout applied.
pub(crate) fn build_http_client(timeout: Duration) -> reqwest::Client {
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Endpoint URL for the configured protocol.
pub(super) fn endpoint_url(protocol: ApiProtocol, base_url: &str) -> String {
    match protocol {
        ApiProtocol::Completions => format!("{base_url}/chat/completions"),
        ApiProtocol::Messages => format!("{base_url}/messages"),
    }
}

/// Dispatch one model request and return the raw JSON payload.
pub(super) async fn dispatch_request(
    http: &reqwest::Client,
    protocol: ApiProtocol,
    base_url: &str,
    api_key: &str,
    request: &ModelRequest,
) -> Result<Value, ApiError> {
    let url = endpoint_url(protocol, base_url);
    let (body, mut req) = match protocol {
        ApiProtocol::Completions => {
            let mut req = http.post(&url);
            if !api_key.is_empty() {
                req = req.header("Authorization", format!("Bearer {api_key}"));
            }
            (build_completions_body(request), req)
        }
        ApiProtocol::Messages => {
            let mut req = http.post(&url).header("anthropic-version", ANTHROPIC_VERSION);
            if !api_key.is_empty() {
                req = req.header("x-api-key", api_key);
            }
            (build_messages_body(request), req)
        }
    };
    req = req.json(&body);

    let response = req.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Status {
            code: status.as_u16(),
            body,
        }
        .into());
    }

    let text = response.text().await?;
    serde_json::from_str::<Value>(&text)
        .map_err(|e| TransportError::MalformedBody(e.to_string()).into())
}

/// Add protocol mismatch hints to 404 responses.
pub(super) fn with_diagnostic_hints(protocol: ApiProtocol, err: ApiError) -> ApiError {
    let ApiError::Transport(TransportError::Status { code, mut body }) = err else {
        return err;
    };

    // 404 often means the endpoint speaks the other protocol.
    if code == 404 && protocol == ApiProtocol::Messages {
        body.push_str(
            "\nHint: this endpoint may not support `/messages`; set `protocol = \"completions\"` under [model].",
        );
    }
    if code == 404 && protocol == ApiProtocol::Completions {
        body.push_str(
            "\nHint: this endpoint may not support `/chat/completions`; set `protocol = \"messages\"` under [model].",
        );
    }
    ApiError::Transport(TransportError::Status { code, body })
}
