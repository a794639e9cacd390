use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("latency injection failed: {0}")]
    LatencyInjection(String),

    #[error("snapshot encode failed: {0}")]
    SnapshotEncode(#[from] serde_json::Error),

    #[error("snapshot io failed: {0}")]
    SnapshotIo(#[from] std::io::Error),

    #[error("aggregate row {0} is missing; it must be seeded at startup")]
    AggregateRowMissing(i64),

    #[error("aggregate value out of range: {0}")]
    AggregateRange(String),
}
