use async_trait::async_trait;
use std::time::Duration;

/// Spacing applied between consecutive provider calls of a batch
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Suspend the current workflow until the next call may go out
    async fn pause(&self);
}

/// Fixed pause between calls, kept under the provider's invite rate limit
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl Pacer for FixedInterval {
    async fn pause(&self) {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
    }
}
