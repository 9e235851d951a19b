use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use super::{AuthProvider, Identity, OtpOptions, Session, TableStore};
use crate::config::ProviderConfig;
use crate::error::ProviderError;

/// reqwest client for a Supabase-style deployment
///
/// Auth calls go to `/auth/v1`, table calls to `/rest/v1`. The current
/// session lives here; refresh and sign-in replace it.
pub struct HttpProvider {
    client: Client,
    config: ProviderConfig,
    session: RwLock<Option<Session>>,
}

impl HttpProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            session: RwLock::new(None),
        }
    }

    pub fn with_session(config: ProviderConfig, session: Option<Session>) -> Self {
        Self {
            client: Client::new(),
            config,
            session: RwLock::new(session),
        }
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        let url = self.endpoint("auth/v1/token")?;
        let request = self
            .client
            .post(url)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        let session: Session = decode(self.public(request).send().await?).await?;
        let session = session.with_issued_at(Utc::now());
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    /// Revoke the session server-side and forget it locally
    pub async fn sign_out(&self) -> Result<(), ProviderError> {
        let request = match self.endpoint("auth/v1/logout") {
            Ok(url) => self.authorized(self.client.post(url)).await,
            Err(e) => Err(e),
        };

        // The local session is gone whatever the server says
        self.session.write().await.take();

        let response = request?.send().await?;
        ensure_success(response).await.map(|_| ())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        let base = Url::parse(&format!("{}/", self.config.url.trim_end_matches('/')))?;
        Ok(base.join(path)?)
    }

    fn public(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.config.anon_key)
    }

    /// Stored session, exchanged for a fresh one first if its access token expired
    async fn live_session(&self) -> Result<Option<Session>, ProviderError> {
        match self.current_session().await {
            Some(session) if session.is_expired() => {
                debug!(expired_at = ?session.expires_at_utc(), "access token expired, refreshing");
                self.refresh_session().await.map(Some)
            }
            other => Ok(other),
        }
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ProviderError> {
        let session = self.live_session().await?.ok_or(ProviderError::NoSession)?;
        Ok(self.public(request).bearer_auth(session.access_token))
    }

    /// Data calls fall back to the anon key so RLS sees the `anon` role
    async fn data_request(&self, request: RequestBuilder) -> Result<RequestBuilder, ProviderError> {
        let token = match self.live_session().await? {
            Some(session) => session.access_token,
            None => self.config.anon_key.clone(),
        };
        Ok(self.public(request).bearer_auth(token))
    }
}

#[async_trait]
impl AuthProvider for HttpProvider {
    async fn get_user(&self) -> Result<Option<Identity>, ProviderError> {
        if self.session.read().await.is_none() {
            return Ok(None);
        }

        let request = self.client.get(self.endpoint("auth/v1/user")?);
        let response = self.authorized(request).await?.send().await?;
        let identity: Identity = decode(response).await?;
        Ok(Some(identity))
    }

    async fn refresh_session(&self) -> Result<Session, ProviderError> {
        let refresh_token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .ok_or(ProviderError::NoSession)?;

        let request = self
            .client
            .post(self.endpoint("auth/v1/token")?)
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));

        let session: Session = decode(self.public(request).send().await?).await?;
        let session = session.with_issued_at(Utc::now());
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_in_with_otp(&self, email: &str, options: OtpOptions) -> Result<Value, ProviderError> {
        let mut request = self.client.post(self.endpoint("auth/v1/otp")?);
        if let Some(redirect) = &options.email_redirect_to {
            request = request.query(&[("redirect_to", redirect.as_str())]);
        }
        let request = request.json(&json!({
            "email": email,
            "create_user": true,
            "data": options.data,
        }));

        let response = self.data_request(request).await?.send().await?;
        let body = ensure_success(response).await?;
        Ok(if body.is_null() { json!({}) } else { body })
    }
}

#[async_trait]
impl TableStore for HttpProvider {
    async fn select(&self, table: &str, columns: &str, limit: usize) -> Result<Vec<Value>, ProviderError> {
        let limit = limit.to_string();
        let request = self
            .client
            .get(self.endpoint(&format!("rest/v1/{}", table))?)
            .query(&[("select", columns), ("limit", limit.as_str())]);

        decode(self.data_request(request).await?.send().await?).await
    }

    async fn insert(&self, table: &str, records: Vec<Value>) -> Result<Vec<Value>, ProviderError> {
        let request = self
            .client
            .post(self.endpoint(&format!("rest/v1/{}", table))?)
            .header("Prefer", "return=representation")
            .json(&records);

        decode(self.data_request(request).await?.send().await?).await
    }
}

async fn ensure_success(response: Response) -> Result<Value, ProviderError> {
    let status = response.status();
    let text = response.text().await?;
    debug!(status = status.as_u16(), bytes = text.len(), "provider response");

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };

    if status.is_success() {
        Ok(body)
    } else {
        Err(ProviderError::from_body(status.as_u16(), &body))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let body = ensure_success(response).await?;
    serde_json::from_value(body).map_err(|e| ProviderError::Decode(e.to_string()))
}
