pub mod http;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProviderError;

pub use http::HttpProvider;

/// The signed-in principal as reported by the auth API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl Identity {
    /// Role assigned through user metadata, if any
    pub fn role(&self) -> Option<&str> {
        self.user_metadata.get("role").and_then(Value::as_str)
    }
}

/// Token bundle issued by the auth API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: Option<Identity>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at_utc().is_some_and(|at| at <= Utc::now())
    }

    /// Leading characters of the access token, safe to log
    pub fn token_prefix(&self) -> String {
        let prefix: String = self.access_token.chars().take(20).collect();
        format!("{}...", prefix)
    }

    /// Fill `expires_at` from `expires_in` when the provider only sent the latter
    pub(crate) fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() {
            if let Some(expires_in) = self.expires_in {
                self.expires_at = Some(issued_at.timestamp() + expires_in);
            }
        }
        self
    }
}

/// Options for a passwordless sign-in / invitation
#[derive(Debug, Clone, Default, Serialize)]
pub struct OtpOptions {
    pub email_redirect_to: Option<String>,
    pub data: Map<String, Value>,
}

/// Identity and session operations of the hosted auth service
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current identity, `None` when nobody is signed in
    async fn get_user(&self) -> Result<Option<Identity>, ProviderError>;

    /// Exchange the refresh token for a new session
    async fn refresh_session(&self) -> Result<Session, ProviderError>;

    /// Send a one-time-passcode (magic link) email
    async fn sign_in_with_otp(&self, email: &str, options: OtpOptions) -> Result<Value, ProviderError>;
}

/// Row operations on the hosted data API, subject to RLS
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, table: &str, columns: &str, limit: usize) -> Result<Vec<Value>, ProviderError>;

    /// Insert rows and return their stored representations
    async fn insert(&self, table: &str, records: Vec<Value>) -> Result<Vec<Value>, ProviderError>;
}

/// Everything the console workflows need from the provider
pub trait Provider: AuthProvider + TableStore {}

impl<T: AuthProvider + TableStore> Provider for T {}
