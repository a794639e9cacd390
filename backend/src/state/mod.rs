pub mod counters;
pub mod event_log;
pub mod gate;
mod guarded;

use std::sync::Arc;

use crate::state::counters::{CounterState, EventRecord};
use crate::state::event_log::EventLog;
use crate::state::gate::AdmissionGate;

/// Process-wide state, built once at startup and shared by handlers and
/// background tasks. Each part carries its own lock; none is held while
/// another is taken.
#[derive(Clone)]
pub struct SharedState {
    pub counters: Arc<CounterState>,
    pub events: Arc<EventLog>,
    pub gate: Arc<AdmissionGate>,
}

impl SharedState {
    pub fn new(stats_capacity: usize) -> Self {
        Self {
            counters: Arc::new(CounterState::new()),
            events: Arc::new(EventLog::new()),
            gate: Arc::new(AdmissionGate::new(stats_capacity)),
        }
    }

    /// Counts a view and appends its record to the event log.
    ///
    /// The counter lock is released before the log lock is taken.
    pub fn record_view(&self) -> EventRecord {
        let record = self.counters.record_view();
        self.events.append(record.clone());
        record
    }
}
