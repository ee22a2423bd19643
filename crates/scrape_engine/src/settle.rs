use std::time::Duration;

use scrape_core::{SettleStage, Target};
use scrape_logging::scrape_debug;

/// Waits for a fire-and-forget remote stage to (probably) finish.
///
/// The service gives no completion signal for crawl or content extraction,
/// so the orchestrator suspends here between stages. Cancellation is the
/// caller's job: the returned future is simply dropped.
#[async_trait::async_trait]
pub trait SettleAwaiter: Send + Sync {
    async fn settle(&self, target: &Target, after: SettleStage);
}

/// Sleeps for the same fixed duration after every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[async_trait::async_trait]
impl SettleAwaiter for FixedDelay {
    async fn settle(&self, target: &Target, after: SettleStage) {
        scrape_debug!("{}: settling {:?} for {:?}", target, after, self.delay);
        tokio::time::sleep(self.delay).await;
    }
}
