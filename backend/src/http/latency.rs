use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::error::AppError;

/// Simulated downstream call made by every view.
///
/// Runs after the view is recorded and holds no lock while it waits.
#[async_trait]
pub trait LatencyInjector: Send + Sync {
    async fn inject(&self) -> Result<Duration, AppError>;
}

/// Sleeps a uniformly random duration in `[0, max)`.
pub struct RandomLatency {
    max: Duration,
}

impl RandomLatency {
    pub fn new(max: Duration) -> Self {
        Self { max }
    }
}

#[async_trait]
impl LatencyInjector for RandomLatency {
    async fn inject(&self) -> Result<Duration, AppError> {
        let max_ms = u64::try_from(self.max.as_millis())
            .map_err(|_| AppError::LatencyInjection(format!("delay bound too large: {:?}", self.max)))?;
        if max_ms == 0 {
            return Ok(Duration::ZERO);
        }

        let delay = Duration::from_millis(rand::rng().random_range(0..max_ms));
        tokio::time::sleep(delay).await;
        Ok(delay)
    }
}

/// No delay at all.
pub struct NoLatency;

#[async_trait]
impl LatencyInjector for NoLatency {
    async fn inject(&self) -> Result<Duration, AppError> {
        Ok(Duration::ZERO)
    }
}
