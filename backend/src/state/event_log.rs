use crate::state::counters::EventRecord;
use crate::state::guarded::Guarded;

/// Append-only record of every view event since process start.
///
/// Order is append order. Under concurrency that can differ from the order
/// in which views were counted, since the append happens after the counter
/// lock is released. Growth is unbounded; the persistence task mirrors the
/// whole log on every tick without draining it.
#[derive(Default)]
pub struct EventLog {
    records: Guarded<Vec<EventRecord>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: EventRecord) {
        self.records.update(|r| r.push(record));
    }

    /// Copy of the full sequence. Does not clear the log.
    pub fn snapshot_all(&self) -> Vec<EventRecord> {
        self.records.read(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.records.read(|r| r.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
