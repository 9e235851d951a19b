use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use super::role::{ADMIN_ROLE, TECHNICIAN_ROLE};
use super::types::{InvitationResult, InviteOutcome, TechnicianInvite};
use super::AdminConsole;
use crate::error::ConsoleError;
use crate::provider::{OtpOptions, Provider};

impl<P: Provider> AdminConsole<P> {
    /// Send a magic link that signs the recipient up as a technician.
    ///
    /// Only admins may invite; the check happens before anything is sent.
    pub async fn invite_technician(&self, email: &str, name: &str) -> Result<InviteOutcome, ConsoleError> {
        info!("Sending magic link to technician: {}", email);

        let inviter = self.current_identity().await;
        if inviter.as_ref().and_then(|i| i.role()) != Some(ADMIN_ROLE) {
            warn!("Refusing to invite {}: current user is not an admin", email);
            return Err(ConsoleError::authorization("Only admins can invite technicians"));
        }

        let mut data = Map::new();
        data.insert("role".to_string(), json!(TECHNICIAN_ROLE));
        data.insert(
            "invited_by".to_string(),
            inviter.and_then(|i| i.email).map(Value::String).unwrap_or(Value::Null),
        );
        data.insert("technician_name".to_string(), json!(name));

        let options = OtpOptions {
            email_redirect_to: Some(self.invite.redirect_url()),
            data,
        };

        let response = self.provider.sign_in_with_otp(email, options).await.map_err(|e| {
            error!("Failed to send magic link to {}: {}", email, e);
            ConsoleError::Dispatch(e)
        })?;

        info!("Magic link sent successfully to: {}", email);

        Ok(InviteOutcome {
            success: true,
            email: email.to_string(),
            data: response,
        })
    }

    /// Invite each technician in order, pausing between sends.
    ///
    /// Failures are recorded per entry and never abort the batch; the
    /// result has one entry per input, in input order.
    pub async fn invite_multiple_technicians(&self, technicians: &[TechnicianInvite]) -> Vec<InvitationResult> {
        let mut results = Vec::with_capacity(technicians.len());

        for (index, tech) in technicians.iter().enumerate() {
            if index > 0 {
                self.pacer.pause().await;
            }

            let outcome = self.invite_technician(&tech.email, &tech.name).await;
            results.push(InvitationResult {
                success: outcome.is_ok(),
                email: tech.email.clone(),
                name: tech.name.clone(),
                error: outcome.err().map(|e| e.to_string()),
                timestamp: Utc::now(),
            });
        }

        let sent = results.iter().filter(|r| r.success).count();
        info!("Invited {} of {} technicians", sent, results.len());

        results
    }
}
