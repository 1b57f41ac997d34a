//! API client for hosted model providers.
//!
//! The client facade here stays small: wire bodies come from
//! `request_builder`, decoding from `response_parser`, and HTTP dispatch
//! from `transport`. There is no retry layer; a failed call is reported to
//! the orchestration loop as-is.

mod transport;

pub(crate) use transport::build_http_client;

use super::response_parser::parse_model_reply;
use super::{ModelClient, ModelRequest};
use crate::config::{ApiProtocol, ModelConfig};
use crate::error::ApiError;
use crate::types::ModelReply;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Client for `completions` and `messages` model APIs.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    protocol: ApiProtocol,
}

impl ApiClient {
    /// Build a client from model configuration.
    pub fn new(config: &ModelConfig) -> Self {
        Self::with_timeout(config, Duration::from_secs(config.timeout_secs.max(1)))
    }

    pub fn with_timeout(config: &ModelConfig, timeout: Duration) -> Self {
        Self {
            http: build_http_client(timeout),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            protocol: config.protocol,
        }
    }

    /// Send one model request and return the normalized reply.
    pub async fn invoke(&self, request: &ModelRequest) -> Result<ModelReply, ApiError> {
        debug!(
            protocol = ?self.protocol,
            turns = request.turns.len(),
            tools = request.tools.len(),
            "model request"
        );
        let payload = transport::dispatch_request(
            &self.http,
            self.protocol,
            &self.base_url,
            &self.api_key,
            request,
        )
        .await
        .map_err(|err| transport::with_diagnostic_hints(self.protocol, err))?;
        parse_model_reply(&payload)
    }
}

#[async_trait]
impl ModelClient for ApiClient {
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelReply, ApiError> {
        ApiClient::invoke(self, request).await
    }
}
