use async_trait::async_trait;
use std::time::Duration;

/// Source of the scheduler's pauses. Swapped out in tests to observe the
/// requested durations without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
