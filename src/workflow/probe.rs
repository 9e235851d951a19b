use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::types::{AccessProbeResult, JobId, ProbeOperation};
use super::AdminConsole;
use crate::error::ConsoleError;
use crate::provider::Provider;

const PROBE_DESCRIPTION: &str = "This is a test job created to verify admin access";

/// Synthetic job written by the probe; the title is unique per run
pub fn probe_record(now: DateTime<Utc>) -> Value {
    json!({
        "title": format!("Test Job - {}", now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        "description": PROBE_DESCRIPTION,
        "status": "pending",
    })
}

impl<P: Provider> AdminConsole<P> {
    /// Exercise the table's RLS policies for the current role.
    ///
    /// Read first, then write, so a failure names the policy at fault. The
    /// write creates a real row. Never raises: every failure is captured in
    /// the result.
    pub async fn test_jobs_access(&self) -> AccessProbeResult {
        info!("Testing {} table access...", self.probe.table);

        if let Err(e) = self.refresh_user_session().await {
            error!("Failed to test {} access: {}", self.probe.table, e);
            return AccessProbeResult::failed(ProbeOperation::Unknown, e.to_string());
        }

        let jobs = match self.provider.select(&self.probe.table, "*", self.probe.select_limit).await {
            Ok(rows) => rows,
            Err(source) => {
                let e = ConsoleError::ProbeStep { operation: ProbeOperation::Select, source };
                error!("{} SELECT failed: {}", self.probe.table, e);
                return AccessProbeResult::failed(ProbeOperation::Select, e.to_string());
            }
        };
        let jobs_count = jobs.len();
        info!("{} SELECT successful - found {} jobs", self.probe.table, jobs_count);

        if !self.probe.allow_write {
            warn!("Write probe disabled; skipping {} INSERT", self.probe.table);
            return AccessProbeResult::insert_failed(jobs_count, "write probe disabled by configuration");
        }

        let inserted = match self.provider.insert(&self.probe.table, vec![probe_record(Utc::now())]).await {
            Ok(rows) => rows,
            Err(source) => {
                let e = ConsoleError::ProbeStep { operation: ProbeOperation::Insert, source };
                error!("{} INSERT failed: {}", self.probe.table, e);
                return AccessProbeResult::insert_failed(jobs_count, e.to_string());
            }
        };

        match inserted.first().and_then(|row| row.get("id")).and_then(JobId::from_value) {
            Some(id) => {
                info!("{} INSERT successful - created job: {}", self.probe.table, id);
                AccessProbeResult::succeeded(jobs_count, id)
            }
            None => {
                error!("{} INSERT returned no record id", self.probe.table);
                AccessProbeResult::insert_failed(jobs_count, "insert returned no record id")
            }
        }
    }
}
