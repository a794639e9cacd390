//! Durable mirrors of the in-memory state.
//!
//! Two independent sinks, written by the persistence task and read by the
//! stats endpoint:
//! - a snapshot sink holding the whole event log, overwritten on every flush
//! - an aggregate repository holding the single view/click row
//!
//! The two are never updated transactionally; either may lag the other by a
//! tick after a failed write.

pub mod json_file;
pub mod repository_sqlx;

use anyhow::Result;
use async_trait::async_trait;

use crate::state::counters::EventRecord;

/// View/click totals as stored in the aggregate row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub view: u64,
    pub click: u64,
}

#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Replaces the stored snapshot with `records`.
    async fn overwrite(&self, records: &[EventRecord]) -> Result<()>;

    /// Loads the stored snapshot. Missing or unreadable data yields an
    /// empty list, never an error.
    async fn load(&self) -> Vec<EventRecord>;
}

#[async_trait]
pub trait AggregateRepository: Send + Sync {
    /// Updates the existing aggregate row. Never inserts.
    async fn update(&self, totals: Aggregate) -> Result<()>;

    async fn fetch(&self) -> Result<Option<Aggregate>>;
}
