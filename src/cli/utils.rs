use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::workflow::{AccessProbeResult, InvitationResult, TechnicianInvite, VerificationReport};

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(fields)) = data {
                if let Some(body) = response.as_object_mut() {
                    body.extend(fields);
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print any serializable result as pretty JSON
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✅"
    } else {
        "❌"
    }
}

/// Text lines describing an access probe result
pub fn probe_lines(result: &AccessProbeResult) -> Vec<String> {
    if result.success {
        return vec![
            "✅ Jobs access confirmed - RLS policies working correctly".to_string(),
            format!("   - Found {} existing jobs", result.jobs_count.unwrap_or(0)),
            format!(
                "   - Created test job: {}",
                result.new_job_id.as_ref().map(|id| id.to_string()).unwrap_or_default()
            ),
        ];
    }

    let mut lines = vec![format!(
        "❌ Jobs {} failed: {}",
        result.operation.map(|op| op.to_string()).unwrap_or_else(|| "access".to_string()),
        result.error.as_deref().unwrap_or("unknown error")
    )];
    if let Some(count) = result.jobs_count {
        lines.push(format!("   - SELECT succeeded, found {} jobs", count));
    }
    lines
}

/// Text lines describing a verification report
pub fn report_lines(report: &VerificationReport) -> Vec<String> {
    let mut lines = vec![
        "Verification Results:".to_string(),
        format!("   User Role: {}", report.user_role.as_deref().unwrap_or("none")),
        format!("   Is Admin: {}", report.is_admin),
        format!("   Session Refresh: {}", mark(report.session_refresh)),
        format!(
            "   Jobs Access: {}",
            mark(report.jobs_access.as_ref().is_some_and(|r| r.success))
        ),
    ];

    if let Some(access) = report.jobs_access.as_ref().filter(|r| !r.success) {
        lines.push(format!("   Jobs Error: {}", access.error.as_deref().unwrap_or("unknown error")));
    }
    if let Some(error) = &report.error {
        lines.push(format!("   Error: {}", error));
    }
    lines
}

/// Text lines describing batch invitation results
pub fn invitation_lines(results: &[InvitationResult]) -> Vec<String> {
    results
        .iter()
        .map(|r| {
            let who = if r.name.is_empty() {
                r.email.clone()
            } else {
                format!("{} ({})", r.name, r.email)
            };
            match &r.error {
                None => format!("✅ Magic link sent to {}", who),
                Some(error) => format!("❌ Failed to invite {}: {}", who, error),
            }
        })
        .collect()
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

/// Collect technicians from `EMAIL[:NAME]` arguments and an optional JSON file
pub fn load_technicians(entries: &[String], file: Option<&str>) -> anyhow::Result<Vec<TechnicianInvite>> {
    let mut technicians = Vec::new();

    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
        let listed: Vec<TechnicianInvite> = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid technician list in {}: {}", path, e))?;
        technicians.extend(listed);
    }

    for entry in entries {
        technicians.push(entry.parse::<TechnicianInvite>().map_err(|e: String| anyhow::anyhow!(e))?);
    }

    if technicians.is_empty() {
        return Err(anyhow::anyhow!("No technicians given; pass EMAIL[:NAME] arguments or --file"));
    }

    Ok(technicians)
}
