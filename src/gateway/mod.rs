//! Remote tool gateway: discovery and execution of integration tools.
//!
//! The orchestration loop only sees the [`ToolGateway`] trait. The concrete
//! [`GatewayClient`] speaks JSON-RPC over HTTP to an MCP-style endpoint that
//! hosts a discovery tool and an execution tool.

mod client;
pub mod envelope;

pub use client::{parse_discovery, GatewayClient};

use crate::error::GatewayError;
use async_trait::async_trait;
use serde_json::Value;

/// A tool schema exactly as the gateway described it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawToolSchema {
    /// Gateway-native slug.
    pub slug: String,
    pub description: String,
    pub input_schema: Option<Value>,
}

/// Result of one discovery call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discovery {
    pub tools: Vec<RawToolSchema>,
    /// Session minted or confirmed by the gateway.
    pub session: Option<String>,
}

/// Contract the orchestrator consumes from the tool gateway.
#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Rank candidate tools for a free-text need.
    ///
    /// `session` is reused when present; otherwise the gateway is asked to
    /// mint one.
    async fn discover(&self, query: &str, session: Option<&str>)
        -> Result<Discovery, GatewayError>;

    /// Execute one tool by slug and return its raw result.
    async fn execute(
        &self,
        slug: &str,
        arguments: &Value,
        session: Option<&str>,
    ) -> Result<Value, GatewayError>;
}
