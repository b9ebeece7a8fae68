//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use niti_core::LifeStage;

/// Niti - Timeless financial wisdom for your actual spending
#[derive(Parser)]
#[command(name = "niti")]
#[command(about = "Match your spending to principles from Kautilya's Arthashastra", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Analyzer/matcher config file (TOML); defaults to the data dir override or built-in
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Knowledge base file (YAML); defaults to the data dir override or built-in
    #[arg(long, global = true)]
    pub knowledge: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Expense/budget inputs shared by the analysis commands
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Expense file (.csv with date,category,amount[,description] or .json)
    #[arg(short, long)]
    pub expenses: PathBuf,

    /// Budget file (.csv with category,limit or .json)
    #[arg(short, long)]
    pub budgets: Option<PathBuf>,

    /// Actual monthly income (otherwise only estimated from spending)
    #[arg(long)]
    pub income: Option<f64>,

    /// Life stage: student, professional, family, retired
    #[arg(long)]
    pub life_stage: Option<LifeStage>,

    /// Reference date for the "current month" (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze expenses and budgets into a financial context
    Context {
        #[command(flatten)]
        data: DataArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find the principles most relevant to a question
    Wisdom {
        /// Your question, e.g. "how do I save for emergencies?"
        query: String,

        #[command(flatten)]
        data: DataArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the full prompt for a text-generation backend
    Prompt {
        /// Your question (included verbatim)
        query: String,

        #[command(flatten)]
        data: DataArgs,

        /// Output system/user messages as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the principles in the knowledge base
    Principles {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the prompt template
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., wisdom_advisor)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}
