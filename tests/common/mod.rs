#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use jobs_console::config::{AppConfig, Environment, ProviderConfig};
use jobs_console::provider::HttpProvider;
use jobs_console::workflow::AdminConsole;

pub const ANON_KEY: &str = "test-anon-key";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Mutable state behind the fake auth + data API
pub struct ProviderState {
    /// Role assigned in the user directory
    pub role: Option<String>,
    /// Role as of the last issued session; `/auth/v1/user` reports this one
    pub session_role: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub issued: u32,
    pub rows: Vec<Value>,
    pub select_error: Option<(u16, Value)>,
    pub insert_error: Option<(u16, Value)>,
    pub rejected_emails: HashMap<String, String>,
    pub otp_requests: Vec<OtpRequest>,
    pub insert_prefer: Vec<Option<String>>,
    pub logged_out: bool,
}

#[derive(Debug, Clone)]
pub struct OtpRequest {
    pub redirect_to: Option<String>,
    pub body: Value,
}

impl ProviderState {
    pub fn with_role(role: Option<&str>) -> Self {
        Self {
            role: role.map(str::to_string),
            session_role: role.map(str::to_string),
            access_token: "access-0".to_string(),
            refresh_token: "refresh-0".to_string(),
            issued: 0,
            rows: Vec::new(),
            select_error: None,
            insert_error: None,
            rejected_emails: HashMap::new(),
            otp_requests: Vec::new(),
            insert_prefer: Vec::new(),
            logged_out: false,
        }
    }

    fn user(&self) -> Value {
        let mut metadata = json!({});
        if let Some(role) = &self.session_role {
            metadata["role"] = json!(role);
        }
        json!({
            "id": "0d6f4c1e-8d8b-4a57-9d0c-5b1f7e3a2c11",
            "aud": "authenticated",
            "email": ADMIN_EMAIL,
            "user_metadata": metadata,
            "app_metadata": { "provider": "email" }
        })
    }

    fn issue_session(&mut self) -> Value {
        self.issued += 1;
        self.session_role = self.role.clone();
        self.access_token = format!("access-{}", self.issued);
        self.refresh_token = format!("refresh-{}", self.issued);
        json!({
            "access_token": self.access_token,
            "refresh_token": self.refresh_token,
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": chrono::Utc::now().timestamp() + 3600,
            "user": self.user()
        })
    }
}

type Shared = Arc<Mutex<ProviderState>>;

pub struct FakeProvider {
    pub base_url: String,
    pub state: Shared,
}

impl FakeProvider {
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            url: self.base_url.clone(),
            anon_key: ANON_KEY.to_string(),
        }
    }

    pub fn app_config(&self) -> AppConfig {
        let mut config = AppConfig::for_environment(Environment::Development);
        config.provider = self.provider_config();
        config.invite.interval_ms = 0;
        config
    }

    /// Signed-in HTTP client and a console over it
    pub async fn console(&self) -> Result<AdminConsole<HttpProvider>> {
        let provider = HttpProvider::new(self.provider_config());
        provider
            .sign_in_with_password(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .context("password sign-in against fake provider")?;
        Ok(AdminConsole::new(Arc::new(provider), &self.app_config()))
    }

    /// Console over an existing client, e.g. one seeded with a stored session
    pub fn console_over(&self, provider: HttpProvider) -> AdminConsole<HttpProvider> {
        AdminConsole::new(Arc::new(provider), &self.app_config())
    }

    pub fn with_state<T>(&self, f: impl FnOnce(&mut ProviderState) -> T) -> T {
        let mut state = self.state.lock().expect("provider state poisoned");
        f(&mut state)
    }
}

pub async fn spawn_provider(state: ProviderState) -> Result<FakeProvider> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let state: Shared = Arc::new(Mutex::new(state));
    let app = Router::new()
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/user", get(user))
        .route("/auth/v1/logout", post(logout))
        .route("/auth/v1/otp", post(otp))
        .route("/rest/v1/jobs", get(select_jobs).post(insert_jobs))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind fake provider")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(FakeProvider { base_url, state })
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn has_apikey(headers: &HeaderMap) -> bool {
    headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(ANON_KEY)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn token(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_apikey(&headers) {
        return error(StatusCode::UNAUTHORIZED, json!({ "message": "No API key found in request" }));
    }

    let mut state = state.lock().unwrap();
    match query.get("grant_type").map(String::as_str) {
        Some("password") => {
            if body["email"] == ADMIN_EMAIL && body["password"] == ADMIN_PASSWORD {
                Json(state.issue_session()).into_response()
            } else {
                error(
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" }),
                )
            }
        }
        Some("refresh_token") => {
            if body["refresh_token"] == state.refresh_token.as_str() && !state.logged_out {
                Json(state.issue_session()).into_response()
            } else {
                error(
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "invalid_grant",
                        "error_description": "Invalid Refresh Token: Refresh Token Not Found"
                    }),
                )
            }
        }
        _ => error(StatusCode::BAD_REQUEST, json!({ "msg": "unsupported_grant_type" })),
    }
}

async fn user(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if !has_apikey(&headers) || bearer(&headers).as_deref() != Some(state.access_token.as_str()) {
        return error(StatusCode::UNAUTHORIZED, json!({ "code": 401, "msg": "invalid JWT: unable to parse or verify signature" }));
    }
    Json(state.user()).into_response()
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    if bearer(&headers).as_deref() != Some(state.access_token.as_str()) {
        return error(StatusCode::UNAUTHORIZED, json!({ "code": 401, "msg": "invalid JWT" }));
    }
    state.logged_out = true;
    StatusCode::NO_CONTENT.into_response()
}

async fn otp(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_apikey(&headers) {
        return error(StatusCode::UNAUTHORIZED, json!({ "message": "No API key found in request" }));
    }

    let mut state = state.lock().unwrap();
    state.otp_requests.push(OtpRequest {
        redirect_to: query.get("redirect_to").cloned(),
        body: body.clone(),
    });

    let email = body["email"].as_str().unwrap_or_default();
    match state.rejected_emails.get(email) {
        Some(message) => error(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "code": 422, "error_code": "validation_failed", "msg": message }),
        ),
        None => Json(json!({})).into_response(),
    }
}

async fn select_jobs(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let state = state.lock().unwrap();
    if !has_apikey(&headers) || bearer(&headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, json!({ "message": "No API key found in request" }));
    }
    if let Some((status, body)) = &state.select_error {
        return error(StatusCode::from_u16(*status).unwrap(), body.clone());
    }

    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let rows: Vec<Value> = state.rows.iter().take(limit).cloned().collect();
    Json(rows).into_response()
}

async fn insert_jobs(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Vec<Value>>,
) -> Response {
    let mut state = state.lock().unwrap();
    state
        .insert_prefer
        .push(headers.get("prefer").and_then(|v| v.to_str().ok()).map(str::to_string));

    if let Some((status, body)) = &state.insert_error {
        return error(StatusCode::from_u16(*status).unwrap(), body.clone());
    }

    let stored: Vec<Value> = body
        .into_iter()
        .enumerate()
        .map(|(i, mut row)| {
            row["id"] = json!(1000 + state.rows.len() + i);
            row
        })
        .collect();
    state.rows.extend(stored.iter().cloned());
    (StatusCode::CREATED, Json(stored)).into_response()
}
