use clap::Subcommand;

use crate::cli::utils::{output_json, print_lines, probe_lines};
use crate::cli::{connect, persist_session, OutputFormat};
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum JobsCommands {
    #[command(about = "Select then insert a test job to check RLS policies (creates a real row)")]
    Probe,
}

pub async fn handle(cmd: JobsCommands, app_config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        JobsCommands::Probe => {
            let console = connect(app_config)?;
            let result = console.test_jobs_access().await;
            persist_session(&console).await?;

            match output_format {
                OutputFormat::Json => output_json(&result),
                OutputFormat::Text => {
                    print_lines(&probe_lines(&result));
                    Ok(())
                }
            }
        }
    }
}
