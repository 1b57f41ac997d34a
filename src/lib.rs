//! officebot: the tool-using chat orchestrator behind a virtual office.
//!
//! Each chat exchange resolves a compact tool manifest from a remote MCP
//! gateway, then alternates model invocations and tool executions until the
//! model answers in plain text, the iteration cap is reached, or the
//! wall-clock budget runs out.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use officebot::agent::{Agent, ExchangeRequest};
//! use officebot::api::ApiClient;
//! use officebot::config::load_config;
//! use officebot::gateway::GatewayClient;
//! use officebot::types::ConversationTurn;
//!
//! # async fn example() {
//! let config = load_config(None).unwrap();
//! let model = Arc::new(ApiClient::new(&config.model));
//! let gateway = Arc::new(GatewayClient::new(&config.gateway));
//! let agent = Agent::from_config(&config, model, gateway);
//! let result = agent
//!     .run(ExchangeRequest {
//!         history: vec![ConversationTurn::user("What's on my calendar?")],
//!         tools_enabled: true,
//!         ..ExchangeRequest::default()
//!     })
//!     .await
//!     .unwrap();
//! println!("{}", result.final_text);
//! # }
//! ```

pub mod agent;
pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod persona;
pub mod server;
#[cfg(test)]
pub mod testsupport;
pub mod textutil;
pub mod tools;
pub mod types;
