pub mod commands;
pub mod config;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::ConsoleError;
use crate::provider::HttpProvider;
use crate::workflow::AdminConsole;

#[derive(Parser)]
#[command(name = "jobsctl")]
#[command(about = "Jobs console - session, RLS and technician onboarding checks for a hosted auth backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Provider base URL (overrides SUPABASE_URL)")]
    pub url: Option<String>,

    #[arg(long, global = true, help = "Provider public API key (overrides SUPABASE_ANON_KEY)")]
    pub anon_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Row-level security checks on the jobs table")]
    Jobs {
        #[command(subcommand)]
        cmd: commands::jobs::JobsCommands,
    },

    #[command(about = "Send magic-link invitations to technicians")]
    Invite {
        #[command(subcommand)]
        cmd: commands::invite::InviteCommands,
    },

    #[command(about = "Run the complete setup verification")]
    Verify,

    #[command(about = "Refresh, probe jobs access, then invite technicians")]
    Onboard {
        #[arg(help = "Technicians as EMAIL or EMAIL:NAME")]
        technicians: Vec<String>,
        #[arg(long, help = "JSON file with an array of {\"email\", \"name\"} entries")]
        file: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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
    let config = AppConfig::from_env().with_provider(cli.url, cli.anon_key);

    if config.provider.is_placeholder() {
        tracing::warn!("Provider URL or anon key not configured; set SUPABASE_URL and SUPABASE_ANON_KEY");
    }

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &config, output_format.clone()).await,
        Commands::Jobs { cmd } => commands::jobs::handle(cmd, &config, output_format.clone()).await,
        Commands::Invite { cmd } => commands::invite::handle(cmd, &config, output_format.clone()).await,
        Commands::Verify => commands::verify::handle(&config, output_format.clone()).await,
        Commands::Onboard { technicians, file } => {
            commands::onboard::handle(technicians, file, &config, output_format.clone()).await
        }
    };

    // Propagated workflow errors still produce a JSON body for scripted callers
    if let (Err(e), OutputFormat::Json) = (&result, &output_format) {
        if let Some(console_error) = e.downcast_ref::<ConsoleError>() {
            println!("{}", serde_json::to_string_pretty(&console_error.to_json())?);
        }
    }

    result
}

/// Provider client seeded with the stored session, plus a console over it
pub(crate) fn connect(config: &AppConfig) -> anyhow::Result<AdminConsole<HttpProvider>> {
    let session = config::load_session()?;
    let provider = Arc::new(HttpProvider::with_session(config.provider.clone(), session));
    Ok(AdminConsole::new(provider, config))
}

/// Store whatever session the provider holds now, e.g. after a refresh
pub(crate) async fn persist_session(console: &AdminConsole<HttpProvider>) -> anyhow::Result<()> {
    if let Some(session) = console.provider().current_session().await {
        config::save_session(&session)?;
    }
    Ok(())
}
