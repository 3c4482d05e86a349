pub mod commands;
pub mod context;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub use context::CliContext;

#[derive(Parser)]
#[command(name = "taskdesk")]
#[command(about = "taskdesk CLI - tasks, users and the status board of the project dashboard")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Login, logout and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Resolve a dashboard path through the route guard")]
    Open {
        #[arg(help = "Path such as /task or /dashboard")]
        path: String,
    },

    #[command(about = "Task list, search and mutations")]
    Task {
        #[command(subcommand)]
        cmd: commands::task::TaskCommands,
    },

    #[command(about = "User administration")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Tasks grouped by status")]
    Board,

    #[command(about = "List roles")]
    Roles,

    #[command(about = "List users that can be assigned to tasks")]
    Collaborators,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let ctx = CliContext::init(output_format)?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx).await,
        Commands::Open { path } => commands::open::handle(&path, &ctx),
        Commands::Task { cmd } => commands::task::handle(cmd, &ctx).await,
        Commands::User { cmd } => commands::user::handle(cmd, &ctx).await,
        Commands::Board => commands::board::handle(&ctx).await,
        Commands::Roles => commands::lookup::roles(&ctx).await,
        Commands::Collaborators => commands::lookup::collaborators(&ctx).await,
    }
}
