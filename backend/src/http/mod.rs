//! HTTP transport. Handlers are thin: each one calls into the shared state
//! or the sinks and renders plain text.

pub mod handlers;
pub mod latency;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::config::{AppConfig, probability_or};
use crate::http::latency::LatencyInjector;
use crate::metrics::counters::Counters;
use crate::sink::{AggregateRepository, SnapshotSink};
use crate::state::SharedState;

#[derive(Clone)]
pub struct AppState {
    pub shared: SharedState,
    pub snapshots: Arc<dyn SnapshotSink>,
    pub aggregate: Arc<dyn AggregateRepository>,
    pub latency: Arc<dyn LatencyInjector>,
    pub metrics: Counters,
    click_probability: f64,
}

impl AppState {
    pub fn new(
        shared: SharedState,
        snapshots: Arc<dyn SnapshotSink>,
        aggregate: Arc<dyn AggregateRepository>,
        latency: Arc<dyn LatencyInjector>,
        metrics: Counters,
        click_probability: f64,
    ) -> Self {
        Self {
            shared,
            snapshots,
            aggregate,
            latency,
            metrics,
            click_probability: probability_or(
                click_probability,
                AppConfig::default().click_probability,
            ),
        }
    }

    pub fn click_probability(&self) -> f64 {
        self.click_probability
    }
}

pub fn router(app: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::welcome))
        .route("/view/", get(handlers::view))
        .route("/view/{*rest}", get(handlers::view))
        .route("/stats/", get(handlers::stats))
        .route("/stats/{*rest}", get(handlers::stats))
        .fallback(handlers::welcome)
        .with_state(app)
}
