//! Core orchestration loop.
//!
//! The [`Agent`] drives one chat exchange: it discovers tools once (when
//! enabled), invokes the model, executes every proposed tool call, feeds the
//! results back, and loops until the model answers in plain text or the
//! iteration ceiling is reached. The whole loop runs under a wall-clock
//! deadline that starts at the first model invocation.
//!
//! `run` and `run_streaming` share one implementation; streaming only adds
//! an event sink.

use crate::api::{ModelClient, ModelRequest};
use crate::catalog::{CatalogResolution, ToolCatalog, ToolManifest};
use crate::config::{AgentConfig, Config, ModelConfig};
use crate::error::AgentError;
use crate::gateway::ToolGateway;
use crate::persona::{system_prompt, tool_aware_prompt, Persona};
use crate::tools::ToolExecutor;
use crate::types::{
    ConversationTurn, OrchestrationResult, Role, ToolStep, FALLBACK_RESPONSE,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

mod events;

use events::EventSink;
pub use events::{response_payload, ExchangeEvent};

/// Assistant turn text used when the model proposed tools without prose.
const TOOL_PLACEHOLDER_TURN: &str = "Using tool...";

/// Input for one chat exchange.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeRequest {
    pub persona: Persona,
    /// Normalized history, oldest first. Must not be empty.
    pub history: Vec<ConversationTurn>,
    pub tools_enabled: bool,
    /// Gateway session from a previous exchange, if the caller kept one.
    pub session: Option<String>,
    /// Task executions get the tool-aware system prompt.
    pub task_execution: bool,
}

/// Request-scoped accumulator for one exchange.
struct LoopState {
    turns: Vec<ConversationTurn>,
    final_text: String,
    tools_used: Vec<String>,
    tool_steps: Vec<ToolStep>,
    interrupted: Option<String>,
    invocations: usize,
}

impl LoopState {
    fn new(turns: Vec<ConversationTurn>) -> Self {
        Self {
            turns,
            final_text: String::new(),
            tools_used: Vec::new(),
            tool_steps: Vec::new(),
            interrupted: None,
            invocations: 0,
        }
    }

    fn finish(self, session: Option<String>) -> OrchestrationResult {
        let final_text = if self.final_text.trim().is_empty() {
            FALLBACK_RESPONSE.to_string()
        } else {
            self.final_text
        };
        OrchestrationResult {
            final_text,
            tools_used: self.tools_used,
            tool_steps: self.tool_steps,
            session,
            interrupted: self.interrupted,
        }
    }
}

/// Fixed inputs shared by every iteration.
struct LoopContext<'a> {
    system: &'a str,
    manifest: &'a ToolManifest,
    tools_enabled: bool,
    session: Option<&'a str>,
}

/// The orchestrator. Holds no per-exchange state, so one instance can serve
/// concurrent exchanges behind an `Arc`.
pub struct Agent {
    model: Arc<dyn ModelClient>,
    gateway: Arc<dyn ToolGateway>,
    config: AgentConfig,
    model_id: String,
    max_tokens: u32,
    temperature: f64,
    catalog: ToolCatalog,
    executor: ToolExecutor,
}

impl Agent {
    /// Build an agent with default model request parameters.
    pub fn new(
        model: Arc<dyn ModelClient>,
        gateway: Arc<dyn ToolGateway>,
        config: AgentConfig,
    ) -> Self {
        let defaults = ModelConfig::default();
        Self {
            model,
            gateway,
            catalog: ToolCatalog::new(config.description_max_chars),
            executor: ToolExecutor::new(config.result_max_chars, config.summary_max_chars),
            config,
            model_id: defaults.model,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }
    }

    /// Build an agent from full runtime configuration.
    pub fn from_config(
        config: &Config,
        model: Arc<dyn ModelClient>,
        gateway: Arc<dyn ToolGateway>,
    ) -> Self {
        Self::new(model, gateway, config.agent.clone()).with_model_settings(&config.model)
    }

    /// Use the model id and sampling parameters from `model`.
    pub fn with_model_settings(mut self, model: &ModelConfig) -> Self {
        self.model_id = model.model.clone();
        self.max_tokens = model.max_tokens;
        self.temperature = model.temperature;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Run one exchange to completion.
    pub async fn run(&self, request: ExchangeRequest) -> Result<OrchestrationResult, AgentError> {
        self.drive(request, EventSink(None)).await
    }

    /// Run one exchange, pushing progress events as they happen.
    ///
    /// Exactly one terminal event (`done` or `error`) is sent last. The same
    /// outcome is also returned.
    pub async fn run_streaming(
        &self,
        request: ExchangeRequest,
        events: &mpsc::UnboundedSender<ExchangeEvent>,
    ) -> Result<OrchestrationResult, AgentError> {
        let sink = EventSink(Some(events));
        let outcome = self.drive(request, sink).await;
        match &outcome {
            Ok(result) => sink.emit(ExchangeEvent::Done(result.clone())),
            Err(err) => sink.emit(ExchangeEvent::Error {
                message: err.to_string(),
                timeout: err.is_timeout(),
            }),
        }
        outcome
    }

    async fn drive(
        &self,
        request: ExchangeRequest,
        sink: EventSink<'_>,
    ) -> Result<OrchestrationResult, AgentError> {
        let ExchangeRequest {
            persona,
            history,
            tools_enabled,
            session,
            task_execution,
        } = request;
        if history.is_empty() {
            return Err(AgentError::EmptyHistory);
        }
        info!(
            agent = %persona.name,
            role = %persona.role,
            tools_enabled,
            task_execution,
            turns = history.len(),
            "exchange started"
        );
        sink.status("Agent started processing...");

        let CatalogResolution { manifest, session } = if tools_enabled {
            let query = discovery_query(&history);
            sink.status("Discovering tools...");
            self.catalog
                .resolve(self.gateway.as_ref(), query, session.as_deref())
                .await
        } else {
            CatalogResolution {
                manifest: ToolManifest::default(),
                session,
            }
        };

        let system = if task_execution {
            let names: Vec<&str> = manifest
                .tools()
                .iter()
                .map(|tool| tool.sanitized_name.as_str())
                .collect();
            tool_aware_prompt(&persona, &names)
        } else {
            system_prompt(&persona)
        };

        let ctx = LoopContext {
            system: &system,
            manifest: &manifest,
            tools_enabled,
            session: session.as_deref(),
        };
        let mut state = LoopState::new(history);
        let budget = Duration::from_secs(self.config.exchange_timeout_secs);

        let looped = match Instant::now().checked_add(budget) {
            Some(deadline) => {
                tokio::time::timeout_at(deadline, self.iterate(&mut state, &ctx, sink)).await
            }
            None => {
                warn!(secs = budget.as_secs(), "exchange budget out of range; running unbounded");
                Ok(self.iterate(&mut state, &ctx, sink).await)
            }
        };
        match looped {
            Ok(Ok(())) => {
                let invocations = state.invocations;
                let result = state.finish(session.clone());
                info!(
                    invocations,
                    tools = result.tools_used.len(),
                    interrupted = result.interrupted.is_some(),
                    "exchange finished"
                );
                Ok(result)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "exchange failed");
                Err(err)
            }
            Err(_) => {
                warn!(secs = budget.as_secs(), "exchange timed out");
                Err(AgentError::Timeout {
                    secs: budget.as_secs(),
                })
            }
        }
    }

    async fn iterate(
        &self,
        state: &mut LoopState,
        ctx: &LoopContext<'_>,
        sink: EventSink<'_>,
    ) -> Result<(), AgentError> {
        let max_iterations = self.config.max_iterations.max(1);
        let step_cap = max_iterations - 1;
        let offered = if ctx.tools_enabled {
            ctx.manifest.tools().to_vec()
        } else {
            Vec::new()
        };

        for iteration in 1..=max_iterations {
            let request = ModelRequest {
                model: self.model_id.clone(),
                system: ctx.system.to_string(),
                turns: state.turns.clone(),
                tools: offered.clone(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            };
            debug!(iteration, max_iterations, "invoking model");
            state.invocations += 1;
            let reply = match self.model.invoke(&request).await {
                Ok(reply) => reply,
                Err(err) if iteration == 1 => return Err(AgentError::Model(err)),
                Err(err) => {
                    // Earlier iterations already produced something worth
                    // returning.
                    warn!(iteration, error = %err, "model call failed mid-exchange");
                    state.interrupted = Some(err.to_string());
                    return Ok(());
                }
            };

            if !reply.text.is_empty() {
                state.final_text = reply.text.clone();
            }
            if reply.tool_calls.is_empty() || !ctx.tools_enabled {
                return Ok(());
            }
            if iteration == max_iterations {
                info!(
                    pending = reply.tool_calls.len(),
                    "iteration ceiling reached; pending tool calls dropped"
                );
                return Ok(());
            }

            let mut results = Vec::with_capacity(reply.tool_calls.len());
            for call in &reply.tool_calls {
                let tool_name = ctx.manifest.original_name(&call.name).to_string();
                if state.tool_steps.len() >= step_cap {
                    results.push(format!("Tool {tool_name} was not run: tool step limit reached"));
                    continue;
                }

                let pending = self
                    .executor
                    .pending_step(&call.id, &tool_name, &call.arguments);
                info!(tool = %tool_name, action = %pending.action, "tool call");
                sink.emit(ExchangeEvent::ToolCall(pending));

                let outcome = self
                    .executor
                    .execute(
                        self.gateway.as_ref(),
                        &tool_name,
                        &call.arguments,
                        ctx.session,
                    )
                    .await;
                let step = self
                    .executor
                    .record_step(&call.id, &tool_name, &call.arguments, &outcome);
                sink.emit(ExchangeEvent::ToolResult(step.clone()));

                if !state.tools_used.contains(&tool_name) {
                    state.tools_used.push(tool_name.clone());
                }
                state.tool_steps.push(step);
                results.push(outcome.turn_text(&tool_name));
            }

            let assistant_text = if reply.text.is_empty() {
                TOOL_PLACEHOLDER_TURN.to_string()
            } else {
                reply.text
            };
            state.turns.push(ConversationTurn::assistant(assistant_text));
            state.turns.push(ConversationTurn::user(results.join("\n\n")));
        }
        Ok(())
    }
}

/// Discovery is seeded by the most recent user turn.
fn discovery_query(history: &[ConversationTurn]) -> &str {
    history
        .iter()
        .rev()
        .find(|turn| turn.role == Role::User)
        .map(|turn| turn.content.as_str())
        .unwrap_or_default()
}
