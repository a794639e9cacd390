use std::fmt::Write;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rand::Rng;
use tracing::{Instrument, debug, error, warn};

use crate::http::AppState;
use crate::logger::{TraceId, record_status, request_span};
use crate::metrics::counters::Counters;
use crate::sink::Aggregate;
use crate::state::counters::{CounterSnapshot, EventRecord};
use crate::time::display;

pub const WELCOME_TEXT: &str = "Welcome to EQ Works 😎";
pub const RATE_LIMITED_TEXT: &str = "request exceeded limit";
pub const NO_DATA_TEXT: &str = "No Data yet";

pub async fn welcome() -> &'static str {
    WELCOME_TEXT
}

/// Records a view, waits out the simulated downstream latency, then maybe
/// records a click and reports the current counters.
pub async fn view(State(app): State<AppState>) -> Response {
    let trace_id = TraceId::random();

    async move {
        let record = app.shared.record_view();
        Counters::bump(&app.metrics.views);

        if let Err(e) = app.latency.inject().await {
            warn!(error = %e, view = record.view, "view failed after recording");
            record_status(400);
            return StatusCode::BAD_REQUEST.into_response();
        }

        if rand::rng().random_bool(app.click_probability()) {
            app.shared.counters.record_click();
            Counters::bump(&app.metrics.clicks);
        }

        let snap = app.shared.counters.snapshot();
        debug!(view = snap.view, click = snap.click, "view served");
        record_status(200);

        render_view(&snap, &record).into_response()
    }
    .instrument(request_span("/view/", &trace_id))
    .await
}

/// Admission-gated read of the persisted snapshot and aggregate row.
pub async fn stats(State(app): State<AppState>) -> Response {
    let trace_id = TraceId::random();

    async move {
        if !app.shared.gate.try_acquire() {
            Counters::bump(&app.metrics.stats_denied);
            record_status(429);
            return (StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED_TEXT).into_response();
        }
        Counters::bump(&app.metrics.stats_admitted);

        let records = app.snapshots.load().await;

        let totals = match app.aggregate.fetch().await {
            Ok(Some(a)) => a,
            Ok(None) => {
                warn!("aggregate row missing; reporting zero totals");
                Aggregate::default()
            }
            Err(e) => {
                error!(error = ?e, "aggregate read failed");
                record_status(500);
                return (StatusCode::INTERNAL_SERVER_ERROR, "stats unavailable").into_response();
            }
        };

        record_status(200);
        render_stats(&records, totals).into_response()
    }
    .instrument(request_span("/stats/", &trace_id))
    .await
}

pub fn render_view(snap: &CounterSnapshot, record: &EventRecord) -> String {
    let (content, at) = match snap.selection {
        Some(sel) => (sel.content, sel.at),
        None => (record.content_selected, record.time_selected),
    };

    format!(
        "content: {} \n clicks: {} \n view: {} \n {}",
        content,
        snap.click,
        snap.view,
        display(&at)
    )
}

pub fn render_stats(records: &[EventRecord], totals: Aggregate) -> String {
    let mut out = String::from("stats page\n");

    if records.is_empty() {
        out.push_str(NO_DATA_TEXT);
        return out;
    }

    // writing into a String cannot fail
    let _ = write!(out, "View: {} \n Click: {}\n", totals.view, totals.click);
    for r in records {
        let _ = write!(
            out,
            "content: {} \n date: {}\n",
            r.content_selected,
            display(&r.time_selected)
        );
    }
    out
}
