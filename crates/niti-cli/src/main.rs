//! Niti CLI - Financial wisdom engine
//!
//! Usage:
//!   niti context --expenses FILE          Analyze spending into a financial context
//!   niti wisdom "QUESTION" --expenses F   Rank principles for a question
//!   niti prompt "QUESTION" --expenses F   Build the full prompt for a backend
//!   niti serve --port 3000                Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = cli.config.as_deref();
    let knowledge = cli.knowledge.as_deref();

    match cli.command {
        Commands::Context { data, json } => {
            let advisor = commands::load_advisor(config, knowledge)?;
            commands::cmd_context(&advisor, &data, json)
        }
        Commands::Wisdom { query, data, json } => {
            let advisor = commands::load_advisor(config, knowledge)?;
            commands::cmd_wisdom(&advisor, &query, &data, json)
        }
        Commands::Prompt { query, data, json } => {
            let advisor = commands::load_advisor(config, knowledge)?;
            commands::cmd_prompt(&advisor, &query, &data, json)
        }
        Commands::Principles { json } => {
            let advisor = commands::load_advisor(config, knowledge)?;
            commands::cmd_principles(&advisor, json)
        }
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Serve { port, host } => {
            let advisor = commands::load_advisor(config, knowledge)?;
            commands::cmd_serve(advisor, &host, port).await
        }
    }
}
