//! CLI entry point for officebot.

mod cli;

use clap::Parser;
use cli::{Args, Command};
use officebot::agent::{Agent, ExchangeEvent, ExchangeRequest};
use officebot::api::ApiClient;
use officebot::config::{config_template, load_config, Config};
use officebot::gateway::GatewayClient;
use officebot::persona::Persona;
use officebot::server::{self, AppState};
use officebot::types::ConversationTurn;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    if matches!(args.command, Command::InitConfig) {
        print!("{}", config_template());
        return;
    }

    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    if config.model.api_key.trim().is_empty() {
        warn!("no model API key configured; set OFFICEBOT_API_KEY or model.api_key_env");
    }
    if !config.gateway.is_configured() {
        warn!(url = %config.gateway.url, "no gateway token configured; tool discovery will likely fail");
    }

    let gateway = Arc::new(GatewayClient::new(&config.gateway));
    let model = Arc::new(ApiClient::new(&config.model));
    let agent = Arc::new(Agent::from_config(&config, model, gateway.clone()));

    let code = match args.command {
        Command::Serve { port, host } => run_serve(&config, agent, gateway, host, port).await,
        Command::Ask {
            prompt,
            tools,
            task,
            stream,
            name,
            role,
            personality,
            session,
        } => {
            let request = ExchangeRequest {
                persona: Persona::new(name.as_deref(), role.as_deref(), personality.as_deref()),
                history: vec![ConversationTurn::user(prompt)],
                tools_enabled: tools,
                session,
                task_execution: task,
            };
            run_ask(&agent, request, stream).await
        }
        Command::InitConfig => 0,
    };
    std::process::exit(code);
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("officebot=info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_serve(
    config: &Config,
    agent: Arc<Agent>,
    gateway: Arc<GatewayClient>,
    host: Option<String>,
    port: Option<u16>,
) -> i32 {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr = match resolve_addr(&host, port).await {
        Some(addr) => addr,
        None => {
            eprintln!("error: cannot resolve listen address {host}:{port}");
            return 1;
        }
    };
    info!(model = %agent.model_id(), gateway = %gateway.url(), "starting server");

    let state = Arc::new(AppState::new(agent, gateway));
    match server::serve(state, addr, &config.server.allowed_origins).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

async fn resolve_addr(host: &str, port: u16) -> Option<SocketAddr> {
    tokio::net::lookup_host((host, port)).await.ok()?.next()
}

async fn run_ask(agent: &Agent, request: ExchangeRequest, stream: bool) -> i32 {
    let outcome = if stream {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                print_event(&event);
            }
        });
        let outcome = agent.run_streaming(request, &tx).await;
        drop(tx);
        let _ = printer.await;
        outcome
    } else {
        agent.run(request).await
    };

    match outcome {
        Ok(result) => {
            if !stream {
                println!("{}", result.final_text);
            }
            if let Some(reason) = &result.interrupted {
                warn!(reason = %reason, "answer is partial");
            }
            0
        }
        Err(e) => {
            error!(error = %e, "exchange failed");
            eprintln!("error: {e}");
            if e.is_timeout() {
                2
            } else {
                1
            }
        }
    }
}

fn print_event(event: &ExchangeEvent) {
    match event {
        ExchangeEvent::Status { message } => eprintln!("• {message}"),
        ExchangeEvent::ToolCall(step) => eprintln!("→ {} ({})", step.action, step.tool_name),
        ExchangeEvent::ToolResult(step) => {
            eprintln!("← {} [{:?}] {}", step.tool_name, step.status, step.summary)
        }
        ExchangeEvent::Done(result) => println!("{}", result.final_text),
        ExchangeEvent::Error { .. } => {}
    }
}
