//! Console workflows over an injected provider
//!
//! Each operation lives in its own module as an `impl` block on
//! [`AdminConsole`]. None of them render anything; the CLI maps their
//! results to output.

pub mod invite;
pub mod pacing;
pub mod probe;
pub mod role;
pub mod session;
pub mod types;
pub mod verify;

use std::sync::Arc;

use crate::config::{AppConfig, InviteConfig, ProbeConfig};
use crate::provider::Provider;

pub use pacing::{FixedInterval, Pacer};
pub use role::{ADMIN_ROLE, TECHNICIAN_ROLE};
pub use types::*;

pub struct AdminConsole<P: Provider> {
    provider: Arc<P>,
    invite: InviteConfig,
    probe: ProbeConfig,
    pacer: Box<dyn Pacer>,
}

impl<P: Provider> AdminConsole<P> {
    pub fn new(provider: Arc<P>, config: &AppConfig) -> Self {
        Self {
            provider,
            invite: config.invite.clone(),
            probe: config.probe.clone(),
            pacer: Box::new(FixedInterval::new(config.invite.interval())),
        }
    }

    /// Replace the spacing used between batch invitations
    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }
}
