use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::config::{AppConfig, Environment};
use crate::error::ProviderError;
use crate::provider::{AuthProvider, Identity, OtpOptions, Session, TableStore};
use crate::workflow::AdminConsole;

/// Provider call observed by [`FakeProvider`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetUser,
    Refresh,
    Select { table: String, limit: usize },
    Insert { table: String, records: Vec<Value> },
    Otp { email: String, redirect_to: Option<String>, data: Map<String, Value> },
}

#[derive(Default)]
struct FakeState {
    identity: Option<Identity>,
    lookup_error: Option<String>,
    refresh_error: Option<String>,
    select_error: Option<String>,
    insert_error: Option<String>,
    insert_without_id: bool,
    rows: Vec<Value>,
    rejected_emails: HashMap<String, String>,
    calls: Vec<Call>,
}

/// Scripted in-memory provider for workflow tests
#[derive(Default)]
pub struct FakeProvider {
    state: Mutex<FakeState>,
}

impl FakeProvider {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in_as(role: Option<&str>) -> Self {
        let mut metadata = Map::new();
        if let Some(role) = role {
            metadata.insert("role".to_string(), json!(role));
        }

        let provider = Self::default();
        provider.state().identity = Some(Identity {
            id: Uuid::new_v4().to_string(),
            email: Some(format!("{}@example.com", role.unwrap_or("nobody"))),
            user_metadata: metadata,
        });
        provider
    }

    pub fn with_rows(self, count: usize) -> Self {
        self.state().rows = (0..count)
            .map(|i| json!({ "id": Uuid::new_v4(), "title": format!("Job {}", i), "status": "pending" }))
            .collect();
        self
    }

    pub fn failing_lookup(self, message: &str) -> Self {
        self.state().lookup_error = Some(message.to_string());
        self
    }

    pub fn failing_refresh(self, message: &str) -> Self {
        self.state().refresh_error = Some(message.to_string());
        self
    }

    pub fn failing_select(self, message: &str) -> Self {
        self.state().select_error = Some(message.to_string());
        self
    }

    pub fn failing_insert(self, message: &str) -> Self {
        self.state().insert_error = Some(message.to_string());
        self
    }

    pub fn inserting_without_id(self) -> Self {
        self.state().insert_without_id = true;
        self
    }

    pub fn rejecting_invite(self, email: &str, message: &str) -> Self {
        self.state().rejected_emails.insert(email.to_string(), message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn otp_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| matches!(c, Call::Otp { .. })).collect()
    }

    pub fn inserts(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Insert { .. })).count()
    }

    pub fn refreshes(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Refresh)).count()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake provider state poisoned")
    }
}

#[async_trait]
impl AuthProvider for FakeProvider {
    async fn get_user(&self) -> Result<Option<Identity>, ProviderError> {
        let mut state = self.state();
        state.calls.push(Call::GetUser);
        if let Some(message) = &state.lookup_error {
            return Err(ProviderError::api(401, message.clone()));
        }
        Ok(state.identity.clone())
    }

    async fn refresh_session(&self) -> Result<Session, ProviderError> {
        let mut state = self.state();
        state.calls.push(Call::Refresh);
        if let Some(message) = &state.refresh_error {
            return Err(ProviderError::api(400, message.clone()));
        }

        let user = state.identity.clone().ok_or(ProviderError::NoSession)?;
        Ok(Session {
            access_token: format!("access-{}", Uuid::new_v4().simple()),
            refresh_token: format!("refresh-{}", Uuid::new_v4().simple()),
            token_type: "bearer".to_string(),
            expires_in: Some(3600),
            expires_at: Some(chrono::Utc::now().timestamp() + 3600),
            user: Some(user),
        })
    }

    async fn sign_in_with_otp(&self, email: &str, options: OtpOptions) -> Result<Value, ProviderError> {
        let mut state = self.state();
        state.calls.push(Call::Otp {
            email: email.to_string(),
            redirect_to: options.email_redirect_to,
            data: options.data,
        });
        if let Some(message) = state.rejected_emails.get(email) {
            return Err(ProviderError::api(400, message.clone()));
        }
        Ok(json!({ "message_id": Uuid::new_v4() }))
    }
}

#[async_trait]
impl TableStore for FakeProvider {
    async fn select(&self, table: &str, _columns: &str, limit: usize) -> Result<Vec<Value>, ProviderError> {
        let mut state = self.state();
        state.calls.push(Call::Select { table: table.to_string(), limit });
        if let Some(message) = &state.select_error {
            return Err(ProviderError::api(403, message.clone()));
        }
        Ok(state.rows.iter().take(limit).cloned().collect())
    }

    async fn insert(&self, table: &str, records: Vec<Value>) -> Result<Vec<Value>, ProviderError> {
        let mut state = self.state();
        state.calls.push(Call::Insert { table: table.to_string(), records: records.clone() });
        if let Some(message) = &state.insert_error {
            return Err(ProviderError::api(403, message.clone()));
        }

        let without_id = state.insert_without_id;
        let stored: Vec<Value> = records
            .into_iter()
            .map(|mut record| {
                if !without_id {
                    record["id"] = json!(Uuid::new_v4());
                }
                record
            })
            .collect();
        state.rows.extend(stored.iter().cloned());
        Ok(stored)
    }
}

/// Console over a fake provider with development defaults and no batch spacing
pub fn console(provider: FakeProvider) -> (AdminConsole<FakeProvider>, Arc<FakeProvider>) {
    let mut config = AppConfig::for_environment(Environment::Development);
    config.invite.interval_ms = 0;
    let provider = Arc::new(provider);
    (AdminConsole::new(provider.clone(), &config), provider)
}

/// Console over a fake provider with an explicit config
pub fn console_with(provider: FakeProvider, config: &AppConfig) -> (AdminConsole<FakeProvider>, Arc<FakeProvider>) {
    let provider = Arc::new(provider);
    (AdminConsole::new(provider.clone(), config), provider)
}
