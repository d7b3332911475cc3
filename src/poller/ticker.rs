use std::time::Duration;

use async_trait::async_trait;

/// Paces the poll loop between cycles.
#[async_trait]
pub trait Ticker: Send {
    /// Wait until the next cycle may start.
    async fn tick(&mut self);
}

/// Fixed pause after each cycle, whatever its outcome.
#[derive(Debug, Clone)]
pub struct SleepTicker {
    period: Duration,
}

impl SleepTicker {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[async_trait]
impl Ticker for SleepTicker {
    async fn tick(&mut self) {
        tokio::time::sleep(self.period).await;
    }
}
