use serde_json::json;
use tracing::info;

use crate::cli::utils::{invitation_lines, load_technicians, output_json, print_lines, probe_lines};
use crate::cli::{connect, persist_session, OutputFormat};
use crate::config::AppConfig;

const NEXT_STEPS: &[&str] = &[
    "Next steps:",
    "   1. Check your email for confirmation of sent magic links",
    "   2. When technicians click their links they are assigned the technician role",
    "   3. Have them sign in and try to access jobs to confirm their RLS policies",
];

/// Refresh, prove jobs access works, then invite the crew
pub async fn handle(
    entries: Vec<String>,
    file: Option<String>,
    app_config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let technicians = load_technicians(&entries, file.as_deref())?;
    let console = connect(app_config)?;

    info!("Step 1: Refreshing session...");
    console.refresh_user_session().await?;
    persist_session(&console).await?;

    info!("Step 2: Testing jobs access...");
    let access = console.test_jobs_access().await;
    persist_session(&console).await?;

    if !access.success {
        match output_format {
            OutputFormat::Json => output_json(&json!({ "jobs_access": access, "invitations": [] }))?,
            OutputFormat::Text => print_lines(&probe_lines(&access)),
        }
        return Err(anyhow::anyhow!(
            "Jobs access failed: {}",
            access.error.as_deref().unwrap_or("unknown error")
        ));
    }

    info!("Step 3: Sending magic links to {} technicians...", technicians.len());
    let invitations = console.invite_multiple_technicians(&technicians).await;

    match output_format {
        OutputFormat::Json => output_json(&json!({
            "jobs_access": access,
            "invitations": invitations,
        })),
        OutputFormat::Text => {
            print_lines(&probe_lines(&access));
            print_lines(&invitation_lines(&invitations));
            println!();
            print_lines(&NEXT_STEPS.iter().map(|s| s.to_string()).collect::<Vec<_>>());
            Ok(())
        }
    }
}
