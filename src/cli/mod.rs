pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "helpdesk-api")]
#[command(about = "Helpdesk API - ticketing backend server and admin tools")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Port to listen on (defaults to HELPDESK_PORT, PORT or 8080)")]
        port: Option<u16>,
        #[arg(long, help = "Keep all data in process memory instead of Postgres")]
        in_memory: bool,
    },

    #[command(about = "Apply the database schema")]
    Migrate,

    #[command(about = "Change the role of an existing account")]
    Promote {
        #[arg(help = "Email of the account")]
        email: String,
        #[arg(help = "New role: admin, operator or user")]
        role: String,
    },

    #[command(about = "Issue a session token without logging in")]
    Token {
        #[arg(help = "User id to embed in the token")]
        user_id: i64,
        #[arg(help = "Role to embed in the token")]
        role: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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

    match cli.command {
        Commands::Serve { port, in_memory } => commands::serve::handle(port, in_memory).await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Promote { email, role } => commands::promote::handle(&email, &role, output_format).await,
        Commands::Token { user_id, role } => commands::token::handle(user_id, &role, output_format),
    }
}
