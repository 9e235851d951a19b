use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims carried by a provider-issued access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Database role (`authenticated`, `anon`), not the console role
    #[serde(default)]
    pub role: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl AccessClaims {
    /// Console role baked into the token at issue time
    pub fn app_role(&self) -> Option<&str> {
        self.user_metadata.get("role").and_then(Value::as_str)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClaimsError {
    #[error("Malformed access token: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
}

/// Read the claims of an access token without checking its signature.
///
/// The signing secret belongs to the provider; this is for display only and
/// must never back an authorization decision.
pub fn decode_unverified(token: &str) -> Result<AccessClaims, ClaimsError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}
