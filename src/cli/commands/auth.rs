use std::io::{self, Write};

use clap::Subcommand;
use serde_json::json;

use crate::auth::decode_unverified;
use crate::cli::utils::{output_json, output_success};
use crate::cli::{config, connect, persist_session, OutputFormat};
use crate::config::AppConfig;
use crate::provider::HttpProvider;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with email and password")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (reads JOBS_CONSOLE_PASSWORD, then stdin, if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and forget the stored session")]
    Logout,

    #[command(about = "Show stored session and access token claims")]
    Status,

    #[command(about = "Refresh the session so the token carries the latest role")]
    Refresh,

    #[command(about = "Show current user and role")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, app_config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password.or_else(|| std::env::var("JOBS_CONSOLE_PASSWORD").ok()) {
                Some(password) => password,
                None => read_password()?,
            };

            let provider = HttpProvider::new(app_config.provider.clone());
            let session = provider.sign_in_with_password(&email, &password).await?;
            config::save_session(&session)?;

            let role = session.user.as_ref().and_then(|u| u.role()).map(str::to_string);
            output_success(
                &output_format,
                &format!("Signed in as {}", email),
                Some(json!({
                    "email": email,
                    "role": role,
                    "expires_at": session.expires_at_utc(),
                })),
            )
        }
        AuthCommands::Logout => {
            let console = connect(app_config)?;
            if console.provider().current_session().await.is_some() {
                if let Err(e) = console.provider().sign_out().await {
                    tracing::warn!("Provider sign-out failed: {}", e);
                }
            }
            let cleared = config::clear_session()?;
            let message = if cleared { "Signed out" } else { "No stored session" };
            output_success(&output_format, message, None)
        }
        AuthCommands::Status => {
            let Some(session) = config::load_session()? else {
                return output_success(&output_format, "Not signed in", Some(json!({ "signed_in": false })));
            };

            let claims = decode_unverified(&session.access_token).ok();
            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "signed_in": true,
                    "expired": session.is_expired(),
                    "expires_at": session.expires_at_utc(),
                    "email": session.user.as_ref().and_then(|u| u.email.clone()),
                    "claims": claims,
                })),
                OutputFormat::Text => {
                    println!("Signed in: {}", session.user.as_ref().and_then(|u| u.email.as_deref()).unwrap_or("unknown"));
                    println!("Access token: {}", session.token_prefix());
                    if let Some(expires_at) = session.expires_at_utc() {
                        let state = if session.is_expired() { "expired" } else { "valid" };
                        println!("Expires at: {} ({})", expires_at.to_rfc3339(), state);
                    }
                    if let Some(claims) = claims {
                        println!("Token role: {}", claims.app_role().unwrap_or("none"));
                        println!("Database role: {}", claims.role.as_deref().unwrap_or("none"));
                    }
                    Ok(())
                }
            }
        }
        AuthCommands::Refresh => {
            let console = connect(app_config)?;
            let session = console.refresh_user_session().await?;
            persist_session(&console).await?;

            output_success(
                &output_format,
                "Session refreshed",
                Some(json!({
                    "access_token": session.token_prefix(),
                    "expires_at": session.expires_at_utc(),
                    "role": session.user.as_ref().and_then(|u| u.role()),
                })),
            )
        }
        AuthCommands::Whoami => {
            let console = connect(app_config)?;
            let identity = console.current_identity().await;
            let role = identity.as_ref().and_then(|i| i.role()).map(str::to_string);

            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "user": identity,
                    "role": role,
                    "is_admin": role.as_deref() == Some(crate::workflow::ADMIN_ROLE),
                    "is_technician": role.as_deref() == Some(crate::workflow::TECHNICIAN_ROLE),
                })),
                OutputFormat::Text => {
                    match &identity {
                        Some(identity) => println!("User: {}", identity.email.as_deref().unwrap_or(&identity.id)),
                        None => println!("No authenticated user"),
                    }
                    println!("Role: {}", role.as_deref().unwrap_or("No role assigned"));
                    Ok(())
                }
            }
        }
    }
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();

    if password.is_empty() {
        return Err(anyhow::anyhow!("Password required"));
    }
    Ok(password)
}
