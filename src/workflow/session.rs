use tracing::{error, info};

use super::AdminConsole;
use crate::error::ConsoleError;
use crate::provider::{Provider, Session};

impl<P: Provider> AdminConsole<P> {
    /// Fetch a new token bundle so the access token carries the latest role.
    ///
    /// Role metadata may have changed server-side; re-query
    /// [`AdminConsole::current_user_role`] afterwards.
    pub async fn refresh_user_session(&self) -> Result<Session, ConsoleError> {
        info!("Refreshing user session...");

        let session = self.provider.refresh_session().await.map_err(|e| {
            error!("Session refresh failed: {}", e);
            ConsoleError::Refresh(e)
        })?;

        info!("Session refreshed successfully");
        info!("New access token: {}", session.token_prefix());
        if let Some(expires_at) = session.expires_at_utc() {
            info!("Expires at: {}", expires_at.to_rfc3339());
        }
        if let Some(role) = session.user.as_ref().and_then(|u| u.role()) {
            info!("User role: {}", role);
        }

        Ok(session)
    }
}
