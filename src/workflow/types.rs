//! Result records produced by the console workflows
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Step of the access probe that a result refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeOperation {
    Select,
    Insert,
    Unknown,
}

impl fmt::Display for ProbeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeOperation::Select => "SELECT",
            ProbeOperation::Insert => "INSERT",
            ProbeOperation::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Primary key of an inserted job row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Uuid(Uuid),
    Number(i64),
    Text(String),
}

impl JobId {
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Uuid(id) => write!(f, "{}", id),
            JobId::Number(id) => write!(f, "{}", id),
            JobId::Text(id) => f.write_str(id),
        }
    }
}

/// Outcome of the read-then-write RLS probe
///
/// A successful probe always carries `jobs_count` and `new_job_id`; a
/// failed one always carries `error` and the `operation` that failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessProbeResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<ProbeOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_job_id: Option<JobId>,
}

impl AccessProbeResult {
    pub fn succeeded(jobs_count: usize, new_job_id: JobId) -> Self {
        Self {
            success: true,
            operation: None,
            error: None,
            select_success: Some(true),
            insert_success: Some(true),
            jobs_count: Some(jobs_count),
            new_job_id: Some(new_job_id),
        }
    }

    /// A step failed before any read succeeded
    pub fn failed(operation: ProbeOperation, error: impl Into<String>) -> Self {
        Self {
            success: false,
            operation: Some(operation),
            error: Some(error.into()),
            select_success: None,
            insert_success: None,
            jobs_count: None,
            new_job_id: None,
        }
    }

    /// The write failed after the read succeeded
    pub fn insert_failed(jobs_count: usize, error: impl Into<String>) -> Self {
        Self {
            select_success: Some(true),
            jobs_count: Some(jobs_count),
            ..Self::failed(ProbeOperation::Insert, error)
        }
    }
}

/// One recipient of a technician invitation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicianInvite {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl TechnicianInvite {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Parses `email` or `email:name`
impl FromStr for TechnicianInvite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (email, name) = match s.split_once(':') {
            Some((email, name)) => (email.trim(), name.trim()),
            None => (s.trim(), ""),
        };

        if email.is_empty() {
            return Err(format!("missing email in '{}'", s));
        }

        Ok(Self::new(email, name))
    }
}

/// Successful single invitation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteOutcome {
    pub success: bool,
    pub email: String,
    pub data: Value,
}

/// Per-recipient entry of a batch invitation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvitationResult {
    pub success: bool,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate of the setup verification run; every field is filled
/// independently, so a failed run still reports what completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub user_role: Option<String>,
    pub is_admin: bool,
    pub session_refresh: bool,
    pub jobs_access: Option<AccessProbeResult>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationReport {
    pub fn started(timestamp: DateTime<Utc>) -> Self {
        Self {
            user_role: None,
            is_admin: false,
            session_refresh: false,
            jobs_access: None,
            timestamp,
            error: None,
        }
    }
}
