use tracing::{info, warn};

use super::AdminConsole;
use crate::error::ConsoleError;
use crate::provider::{Identity, Provider};

pub const ADMIN_ROLE: &str = "admin";
pub const TECHNICIAN_ROLE: &str = "technician";

impl<P: Provider> AdminConsole<P> {
    /// Signed-in identity. Lookup failures are logged and reported as `None`.
    pub async fn current_identity(&self) -> Option<Identity> {
        match self.provider.get_user().await.map_err(ConsoleError::Lookup) {
            Ok(Some(identity)) => Some(identity),
            Ok(None) => {
                info!("No authenticated user");
                None
            }
            Err(e) => {
                warn!("Error getting user: {}", e);
                None
            }
        }
    }

    /// Role from the identity's user metadata
    pub async fn current_user_role(&self) -> Option<String> {
        let identity = self.current_identity().await?;
        let role = identity.role().map(str::to_string);
        info!("Current user role: {}", role.as_deref().unwrap_or("No role assigned"));
        role
    }

    pub async fn is_admin(&self) -> bool {
        self.current_user_role().await.as_deref() == Some(ADMIN_ROLE)
    }

    pub async fn is_technician(&self) -> bool {
        self.current_user_role().await.as_deref() == Some(TECHNICIAN_ROLE)
    }
}
