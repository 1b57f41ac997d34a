//! Model invocation adapter.
//!
//! The API layer is split into cohesive pieces:
//! - `request_builder`: wire bodies for the `completions` and `messages`
//!   protocols
//! - `response_parser`: shape detection and decoding into [`ModelReply`]
//! - `client`: HTTP dispatch and auth headers

use crate::error::ApiError;
use crate::types::{ConversationTurn, ModelReply, ToolDescriptor};
use async_trait::async_trait;

mod client;
mod request_builder;
pub mod response_parser;

pub use client::ApiClient;
pub(crate) use client::build_http_client;

/// One model invocation: history plus the tools on offer.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub system: String,
    pub turns: Vec<ConversationTurn>,
    /// Empty when tools are disabled or none were discovered.
    pub tools: Vec<ToolDescriptor>,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Minimal model API interface used by the orchestration loop.
///
/// This trait lets tests provide deterministic scripted replies without
/// network calls while the production path uses [`ApiClient`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelReply, ApiError>;
}
