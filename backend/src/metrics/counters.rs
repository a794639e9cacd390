use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default)]
pub struct Counters {
    pub views: Arc<AtomicU64>,
    pub clicks: Arc<AtomicU64>,

    pub stats_admitted: Arc<AtomicU64>,
    pub stats_denied: Arc<AtomicU64>,

    pub flushes: Arc<AtomicU64>,
    pub refills: Arc<AtomicU64>,

    // flush failures, per sink
    pub flush_file_failures: Arc<AtomicU64>,
    pub flush_aggregate_failures: Arc<AtomicU64>,
}

impl Counters {
    pub fn bump(c: &AtomicU64) {
        c.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(c: &AtomicU64) -> u64 {
        c.load(Ordering::Relaxed)
    }
}
