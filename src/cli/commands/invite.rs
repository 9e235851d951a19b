use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{invitation_lines, load_technicians, output_json, output_success, print_lines};
use crate::cli::{connect, OutputFormat};
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum InviteCommands {
    #[command(about = "Invite one technician (admin only)")]
    Send {
        #[arg(help = "Technician email")]
        email: String,
        #[arg(long, default_value = "", help = "Technician display name")]
        name: String,
    },

    #[command(about = "Invite technicians one after another, pausing between sends")]
    Batch {
        #[arg(help = "Technicians as EMAIL or EMAIL:NAME")]
        technicians: Vec<String>,
        #[arg(long, help = "JSON file with an array of {\"email\", \"name\"} entries")]
        file: Option<String>,
    },
}

pub async fn handle(cmd: InviteCommands, app_config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        InviteCommands::Send { email, name } => {
            let console = connect(app_config)?;
            let outcome = console.invite_technician(&email, &name).await?;

            output_success(
                &output_format,
                &format!("Magic link sent to {}", outcome.email),
                Some(json!({ "email": outcome.email, "data": outcome.data })),
            )
        }
        InviteCommands::Batch { technicians, file } => {
            let technicians = load_technicians(&technicians, file.as_deref())?;
            let console = connect(app_config)?;
            let results = console.invite_multiple_technicians(&technicians).await;

            match output_format {
                OutputFormat::Json => output_json(&results),
                OutputFormat::Text => {
                    print_lines(&invitation_lines(&results));
                    let sent = results.iter().filter(|r| r.success).count();
                    println!("{} of {} invitations sent", sent, results.len());
                    Ok(())
                }
            }
        }
    }
}
