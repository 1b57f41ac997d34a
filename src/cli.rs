//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};

/// Tool-using chat orchestrator for the virtual office.
#[derive(Debug, Parser)]
#[command(name = "officebot", version)]
pub struct Args {
    /// Path to config file (default: ./officebot.toml or ~/.config/officebot/officebot.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP API for the office UI.
    Serve {
        /// Override the listen port.
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
        /// Override the listen host.
        #[arg(long = "host")]
        host: Option<String>,
    },
    /// Run a single exchange from the terminal and print the answer.
    Ask {
        /// User message to send.
        prompt: String,
        /// Let the agent discover and call gateway tools.
        #[arg(long = "tools")]
        tools: bool,
        /// Treat the prompt as a task to carry out with tools.
        #[arg(long = "task", requires = "tools")]
        task: bool,
        /// Print progress events as they happen.
        #[arg(long = "stream")]
        stream: bool,
        /// Agent display name.
        #[arg(long = "name")]
        name: Option<String>,
        /// Agent role (developer, designer, manager, ...).
        #[arg(long = "role")]
        role: Option<String>,
        /// Agent personality (focused, friendly, ...).
        #[arg(long = "personality")]
        personality: Option<String>,
        /// Resume an existing gateway session.
        #[arg(long = "session")]
        session: Option<String>,
    },
    /// Print a commented example config file.
    InitConfig,
}
