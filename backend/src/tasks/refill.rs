use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::metrics::counters::Counters;
use crate::state::gate::AdmissionGate;
use crate::tasks::periodic::TickAction;

/// Resets the admission gate to full capacity on every tick, unconditionally.
pub struct RefillScheduler {
    gate: Arc<AdmissionGate>,
    metrics: Counters,
}

impl RefillScheduler {
    pub fn new(gate: Arc<AdmissionGate>, metrics: Counters) -> Self {
        Self { gate, metrics }
    }
}

#[async_trait]
impl TickAction for RefillScheduler {
    fn name(&self) -> &'static str {
        "refill_scheduler"
    }

    #[instrument(skip(self), target = "gate")]
    async fn tick(&self) -> anyhow::Result<()> {
        self.gate.refill();
        Counters::bump(&self.metrics.refills);
        Ok(())
    }
}
