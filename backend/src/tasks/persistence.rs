//! Periodic flush of in-memory state to the durable sinks.
//!
//! Each flush is best effort and independent per sink:
//! - the full event log overwrites the snapshot file (last good write wins)
//! - the current view/click totals update the aggregate row
//!
//! A failed write is logged and counted, then retried wholesale with fresh
//! state on the next tick. There is no retry queue and no backoff.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::logger::warn_if_slow;
use crate::metrics::counters::Counters;
use crate::sink::{Aggregate, AggregateRepository, SnapshotSink};
use crate::state::SharedState;
use crate::tasks::periodic::TickAction;

/// Outcome of one flush. Each sink succeeds or fails on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlushReport {
    pub events: usize,
    pub totals: Aggregate,
    pub snapshot_ok: bool,
    pub aggregate_ok: bool,
}

pub struct PersistenceSync {
    state: SharedState,
    snapshots: Arc<dyn SnapshotSink>,
    aggregate: Arc<dyn AggregateRepository>,
    metrics: Counters,
}

impl PersistenceSync {
    pub fn new(
        state: SharedState,
        snapshots: Arc<dyn SnapshotSink>,
        aggregate: Arc<dyn AggregateRepository>,
        metrics: Counters,
    ) -> Self {
        Self {
            state,
            snapshots,
            aggregate,
            metrics,
        }
    }

    /// Writes the event log and the aggregate totals once.
    ///
    /// Both locks are released before any I/O starts; the two snapshots may
    /// therefore disagree by whatever happened in between.
    #[instrument(skip(self), target = "persistence")]
    pub async fn flush(&self) -> FlushReport {
        let records = self.state.events.snapshot_all();
        let snap = self.state.counters.snapshot();
        let totals = Aggregate {
            view: snap.view,
            click: snap.click,
        };

        let snapshot_ok = match warn_if_slow(
            "snapshot_overwrite",
            Duration::from_millis(200),
            self.snapshots.overwrite(&records),
        )
        .await
        {
            Ok(()) => true,
            Err(e) => {
                Counters::bump(&self.metrics.flush_file_failures);
                warn!(error = ?e, events = records.len(), "snapshot flush failed");
                false
            }
        };

        let aggregate_ok = match warn_if_slow(
            "aggregate_update",
            Duration::from_millis(100),
            self.aggregate.update(totals),
        )
        .await
        {
            Ok(()) => true,
            Err(e) => {
                Counters::bump(&self.metrics.flush_aggregate_failures);
                warn!(error = ?e, view = totals.view, click = totals.click, "aggregate flush failed");
                false
            }
        };

        Counters::bump(&self.metrics.flushes);

        if snapshot_ok && aggregate_ok {
            info!(
                events = records.len(),
                view = totals.view,
                click = totals.click,
                "state flushed"
            );
        } else {
            debug!(snapshot_ok, aggregate_ok, "partial flush; next tick retries");
        }

        FlushReport {
            events: records.len(),
            totals,
            snapshot_ok,
            aggregate_ok,
        }
    }
}

#[async_trait]
impl TickAction for PersistenceSync {
    fn name(&self) -> &'static str {
        "persistence_sync"
    }

    async fn tick(&self) -> anyhow::Result<()> {
        self.flush().await;
        Ok(())
    }
}
