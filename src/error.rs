// Provider and workflow error types
use serde_json::{json, Value};
use thiserror::Error;

use crate::workflow::types::ProbeOperation;

/// Failure talking to the hosted auth/data provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("No active session")]
    NoSession,

    #[error("Invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Malformed provider response: {0}")]
    Decode(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ProviderError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ProviderError::Api {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Build an error from a provider error body.
    ///
    /// The auth API reports `msg` or `error_description`, the data API
    /// reports `message`; older deployments only send `error`.
    pub fn from_body(status: u16, body: &Value) -> Self {
        let message = ["msg", "message", "error_description", "error"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| {
                reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Provider request failed")
                    .to_string()
            });

        let code = ["error_code", "code"]
            .iter()
            .find_map(|key| body.get(*key))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });

        ProviderError::Api { status, code, message }
    }

    /// HTTP status, when the provider produced one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            ProviderError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ProviderError::Api { status, .. } => match status {
                400 => "BAD_REQUEST",
                401 => "UNAUTHORIZED",
                403 => "FORBIDDEN",
                404 => "NOT_FOUND",
                409 => "CONFLICT",
                422 => "UNPROCESSABLE_ENTITY",
                429 => "RATE_LIMITED",
                500..=599 => "PROVIDER_UNAVAILABLE",
                _ => "PROVIDER_ERROR",
            },
            ProviderError::NoSession => "NO_SESSION",
            ProviderError::InvalidUrl(_) => "INVALID_URL",
            ProviderError::Decode(_) => "DECODE_ERROR",
            ProviderError::Http(_) => "TRANSPORT_ERROR",
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status_code() == Some(429)
    }
}

/// Errors raised by the console workflows
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Identity lookup failed; the role accessor turns this into `None`
    #[error("Failed to look up user: {0}")]
    Lookup(#[source] ProviderError),

    #[error("{0}")]
    Refresh(#[source] ProviderError),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    Dispatch(#[source] ProviderError),

    #[error("{source}")]
    ProbeStep {
        operation: ProbeOperation,
        #[source]
        source: ProviderError,
    },
}

impl ConsoleError {
    pub fn authorization(message: impl Into<String>) -> Self {
        ConsoleError::Authorization(message.into())
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::Lookup(_) => "LOOKUP_ERROR",
            ConsoleError::Refresh(_) => "REFRESH_ERROR",
            ConsoleError::Authorization(_) => "AUTHORIZATION_ERROR",
            ConsoleError::Dispatch(_) => "DISPATCH_ERROR",
            ConsoleError::ProbeStep { .. } => "PROBE_STEP_ERROR",
        }
    }

    /// Convert to JSON body for `--json` output
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.to_string(),
            "error_code": self.error_code(),
        });

        let provider = match self {
            ConsoleError::Lookup(e) | ConsoleError::Refresh(e) | ConsoleError::Dispatch(e) => Some(e),
            ConsoleError::ProbeStep { source, .. } => Some(source),
            ConsoleError::Authorization(_) => None,
        };

        if let Some(status) = provider.and_then(ProviderError::status_code) {
            body["status"] = json!(status);
        }

        body
    }
}
