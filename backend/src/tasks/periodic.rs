//! Cancellable fixed-period background loop.
//!
//! A task alternates between WAITING (parked on its timer or the shared
//! cancellation token) and EXECUTING (running one tick of its action). When
//! the token fires while it is waiting it moves to TERMINATED and the loop
//! exits. A tick that is already running is allowed to finish first.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Work run on every tick of a periodic task.
#[async_trait]
pub trait TickAction: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn tick(&self) -> anyhow::Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskPhase {
    Waiting = 0,
    Executing = 1,
    Terminated = 2,
}

impl TaskPhase {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => TaskPhase::Waiting,
            1 => TaskPhase::Executing,
            _ => TaskPhase::Terminated,
        }
    }
}

pub struct PeriodicHandle {
    name: &'static str,
    phase: Arc<AtomicU8>,
    join: JoinHandle<()>,
}

impl PeriodicHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn phase(&self) -> TaskPhase {
        TaskPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Waits for the loop to exit. Only returns once the token is cancelled.
    pub async fn join(self) -> Result<(), JoinError> {
        self.join.await
    }
}

/// Spawns `action` on a fixed period. The first tick fires one full period
/// after spawning. Missed ticks are skipped, not replayed.
pub fn spawn_periodic(
    action: Arc<dyn TickAction>,
    every: Duration,
    cancel: CancellationToken,
) -> PeriodicHandle {
    let name = action.name();
    let phase = Arc::new(AtomicU8::new(TaskPhase::Waiting as u8));
    let task_phase = Arc::clone(&phase);

    let join = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(task = name, every_ms = every.as_millis() as u64, "periodic task started");

        loop {
            task_phase.store(TaskPhase::Waiting as u8, Ordering::Release);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            task_phase.store(TaskPhase::Executing as u8, Ordering::Release);
            debug!(task = name, "tick");

            if let Err(e) = action.tick().await {
                warn!(task = name, error = ?e, "periodic tick failed; retrying next period");
            }
        }

        task_phase.store(TaskPhase::Terminated as u8, Ordering::Release);
        info!(task = name, "periodic task stopped");
    });

    PeriodicHandle { name, phase, join }
}
