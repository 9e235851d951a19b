use chrono::Utc;
use tracing::{error, info};

use super::role::ADMIN_ROLE;
use super::types::VerificationReport;
use super::AdminConsole;
use crate::provider::Provider;

impl<P: Provider> AdminConsole<P> {
    /// Role check, session refresh and access probe, in that order.
    ///
    /// A failing step stops the run; its message lands in `error` and the
    /// fields filled so far are kept.
    pub async fn verify_setup(&self) -> VerificationReport {
        info!("Running complete setup verification...");

        let mut report = VerificationReport::started(Utc::now());

        report.user_role = self.current_user_role().await;
        report.is_admin = report.user_role.as_deref() == Some(ADMIN_ROLE);

        match self.refresh_user_session().await {
            Ok(_) => report.session_refresh = true,
            Err(e) => {
                error!("Setup verification failed: {}", e);
                report.error = Some(e.to_string());
                return report;
            }
        }

        report.jobs_access = Some(self.test_jobs_access().await);

        info!(
            user_role = report.user_role.as_deref().unwrap_or("none"),
            is_admin = report.is_admin,
            jobs_access = report.jobs_access.as_ref().is_some_and(|r| r.success),
            "Setup verification complete"
        );

        report
    }
}
