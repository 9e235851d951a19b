use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub provider: ProviderConfig,
    pub invite: InviteConfig,
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Connection settings for the hosted provider. Not validated here; a bad
/// URL or key surfaces as an error from the first provider call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteConfig {
    pub site_url: String,
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub table: String,
    pub select_limit: usize,
    pub allow_write: bool,
}

const PLACEHOLDER_URL: &str = "YOUR_SUPABASE_URL";
const PLACEHOLDER_ANON_KEY: &str = "YOUR_SUPABASE_ANON_KEY";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        Self::for_environment(environment).with_env_overrides()
    }

    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        // Provider overrides; the NEXT_PUBLIC_ names match the dashboard's .env
        if let Some(v) = first_var(&["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"]) {
            self.provider.url = v;
        }
        if let Some(v) = first_var(&["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"]) {
            self.provider.anon_key = v;
        }

        // Invite overrides
        if let Ok(v) = env::var("CONSOLE_SITE_URL") {
            self.invite.site_url = v;
        }
        if let Ok(v) = env::var("INVITE_INTERVAL_MS") {
            self.invite.interval_ms = v.parse().unwrap_or(self.invite.interval_ms);
        }

        // Probe overrides
        if let Ok(v) = env::var("PROBE_TABLE") {
            self.probe.table = v;
        }
        if let Ok(v) = env::var("PROBE_SELECT_LIMIT") {
            self.probe.select_limit = v.parse().unwrap_or(self.probe.select_limit);
        }
        if let Ok(v) = env::var("PROBE_ALLOW_WRITE") {
            self.probe.allow_write = v.parse().unwrap_or(self.probe.allow_write);
        }

        self
    }

    /// Apply `--url` / `--anon-key` style overrides from the command line
    pub fn with_provider(mut self, url: Option<String>, anon_key: Option<String>) -> Self {
        if let Some(url) = url {
            self.provider.url = url;
        }
        if let Some(anon_key) = anon_key {
            self.provider.anon_key = anon_key;
        }
        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            provider: ProviderConfig::placeholder(),
            invite: InviteConfig {
                site_url: "http://localhost:3000".to_string(),
                interval_ms: 1000,
            },
            probe: ProbeConfig {
                table: "jobs".to_string(),
                select_limit: 5,
                allow_write: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            provider: ProviderConfig::placeholder(),
            invite: InviteConfig {
                site_url: "https://staging.example.com".to_string(),
                interval_ms: 1000,
            },
            probe: ProbeConfig {
                table: "jobs".to_string(),
                select_limit: 5,
                allow_write: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            provider: ProviderConfig::placeholder(),
            invite: InviteConfig {
                site_url: "https://app.example.com".to_string(),
                interval_ms: 1000,
            },
            probe: ProbeConfig {
                table: "jobs".to_string(),
                select_limit: 5,
                // The probe inserts real rows
                allow_write: false,
            },
        }
    }
}

impl ProviderConfig {
    fn placeholder() -> Self {
        Self {
            url: PLACEHOLDER_URL.to_string(),
            anon_key: PLACEHOLDER_ANON_KEY.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.url == PLACEHOLDER_URL || self.anon_key == PLACEHOLDER_ANON_KEY
    }
}

impl InviteConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Where the magic link lands after the invitee clicks it
    pub fn redirect_url(&self) -> String {
        match url::Url::parse(&self.site_url).and_then(|base| base.join("/auth/callback")) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}/auth/callback", self.site_url.trim_end_matches('/')),
        }
    }
}

fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok().filter(|v| !v.is_empty()))
}
