use crate::cli::utils::{output_json, print_lines, report_lines};
use crate::cli::{connect, persist_session, OutputFormat};
use crate::config::AppConfig;

pub async fn handle(app_config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = connect(app_config)?;
    let report = console.verify_setup().await;
    persist_session(&console).await?;

    match output_format {
        OutputFormat::Json => output_json(&report),
        OutputFormat::Text => {
            print_lines(&report_lines(&report));
            Ok(())
        }
    }
}
