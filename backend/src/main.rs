use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use view_stats::{
    config::AppConfig,
    db::Db,
    http::{AppState, latency::RandomLatency, router},
    logger::init_tracing,
    metrics::counters::Counters,
    sink::{json_file::JsonFileSink, repository_sqlx::SqlxAggregateRepository},
    state::SharedState,
    tasks::{
        periodic::{PeriodicHandle, spawn_periodic},
        persistence::PersistenceSync,
        refill::RefillScheduler,
    },
};

/// Opens the database, creates the schema and seeds the aggregate row.
/// Any failure here aborts startup.
async fn init_store(cfg: &AppConfig) -> anyhow::Result<Db> {
    let db = Db::connect(&cfg.database_url).await?;
    db.migrate().await?;
    db.seed().await?;

    Ok(db)
}

/// Starts the flush and refill loops on the shared cancellation token.
fn start_background_tasks(
    cfg: &AppConfig,
    persistence: Arc<PersistenceSync>,
    refill: Arc<RefillScheduler>,
    cancel: &CancellationToken,
) -> [PeriodicHandle; 2] {
    [
        spawn_periodic(persistence, cfg.flush_interval, cancel.clone()),
        spawn_periodic(refill, cfg.refill_interval, cancel.clone()),
    ]
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_tracing(is_production);

    let cfg = AppConfig::from_env();

    tracing::info!(bind = %cfg.bind_addr, "Starting view-stats backend...");

    let db = init_store(&cfg).await?;

    let shared = SharedState::new(cfg.stats_capacity);
    let metrics = Counters::default();

    let snapshots = Arc::new(JsonFileSink::new(&cfg.snapshot_path));
    let aggregate = Arc::new(SqlxAggregateRepository::new(db.pool.clone()));

    let persistence = Arc::new(PersistenceSync::new(
        shared.clone(),
        snapshots.clone(),
        aggregate.clone(),
        metrics.clone(),
    ));
    let refill = Arc::new(RefillScheduler::new(shared.gate.clone(), metrics.clone()));

    let cancel = CancellationToken::new();
    let tasks = start_background_tasks(&cfg, persistence.clone(), refill, &cancel);

    let app = AppState::new(
        shared,
        snapshots,
        aggregate,
        Arc::new(RandomLatency::new(cfg.view_max_delay)),
        metrics,
        cfg.click_probability,
    );

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "listening");

    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    cancel.cancel();
    for task in tasks {
        let name = task.name();
        if let Err(e) = task.join().await {
            tracing::error!(task = name, error = ?e, "background task panicked");
        }
    }

    if cfg.flush_on_shutdown {
        let report = persistence.flush().await;
        tracing::info!(?report, "final flush complete");
    }

    db.pool.close().await;
    tracing::info!("view-stats backend stopped");

    Ok(())
}
