use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use uuid::Uuid;

use view_stats::db::Db;
use view_stats::error::AppError;
use view_stats::http::handlers::{NO_DATA_TEXT, RATE_LIMITED_TEXT, WELCOME_TEXT};
use view_stats::http::latency::{LatencyInjector, NoLatency};
use view_stats::http::{AppState, router};
use view_stats::metrics::counters::Counters;
use view_stats::sink::json_file::JsonFileSink;
use view_stats::sink::repository_sqlx::SqlxAggregateRepository;
use view_stats::state::SharedState;
use view_stats::tasks::persistence::PersistenceSync;

struct FailingLatency;

#[async_trait]
impl LatencyInjector for FailingLatency {
    async fn inject(&self) -> Result<Duration, AppError> {
        Err(AppError::LatencyInjection("downstream unavailable".into()))
    }
}

struct TestApp {
    router: Router,
    state: SharedState,
    sync: PersistenceSync,
    metrics: Counters,
    click_probability: f64,
    snapshot_path: std::path::PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.snapshot_path);
    }
}

async fn setup(
    capacity: usize,
    click_probability: f64,
    latency: Arc<dyn LatencyInjector>,
) -> TestApp {
    let conn = format!("sqlite:file:{}?mode=memory&cache=shared", Uuid::new_v4());
    let db = Db::connect(&conn).await.expect("connect");
    db.migrate().await.expect("migrate");
    db.seed().await.expect("seed");

    let snapshot_path = std::env::temp_dir().join(format!("view-stats-{}.json", Uuid::new_v4()));

    let state = SharedState::new(capacity);
    let metrics = Counters::default();
    let snapshots = Arc::new(JsonFileSink::new(&snapshot_path));
    let aggregate = Arc::new(SqlxAggregateRepository::new(db.pool.clone()));

    let sync = PersistenceSync::new(
        state.clone(),
        snapshots.clone(),
        aggregate.clone(),
        metrics.clone(),
    );
    let app = AppState::new(
        state.clone(),
        snapshots,
        aggregate,
        latency,
        metrics.clone(),
        click_probability,
    );

    TestApp {
        click_probability: app.click_probability(),
        router: router(app),
        state,
        sync,
        metrics,
        snapshot_path,
    }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let resp = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn root_and_unknown_paths_serve_welcome() {
    let app = setup(10, 0.5, Arc::new(NoLatency)).await;

    assert_eq!(WELCOME_TEXT, "Welcome to EQ Works 😎");
    assert_eq!(get(&app.router, "/").await, (StatusCode::OK, WELCOME_TEXT.to_string()));
    assert_eq!(
        get(&app.router, "/anything/else").await,
        (StatusCode::OK, WELCOME_TEXT.to_string())
    );
    assert_eq!(app.state.counters.snapshot().view, 0);
}

#[tokio::test]
async fn view_counts_and_reports_current_state() {
    let app = setup(10, 1.0, Arc::new(NoLatency)).await;

    let (status, body) = get(&app.router, "/view/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("content: "), "unexpected body: {body}");
    assert!(body.contains(" \n clicks: 1 \n view: 1 \n "), "unexpected body: {body}");

    let snap = app.state.counters.snapshot();
    assert_eq!((snap.view, snap.click), (1, 1));
    assert_eq!(app.state.events.len(), 1);
    assert_eq!(Counters::get(&app.metrics.views), 1);
}

#[tokio::test]
async fn view_without_clicks_leaves_click_counter() {
    let app = setup(10, 0.0, Arc::new(NoLatency)).await;

    for _ in 0..5 {
        let (status, _) = get(&app.router, "/view/").await;
        assert_eq!(status, StatusCode::OK);
    }

    let snap = app.state.counters.snapshot();
    assert_eq!((snap.view, snap.click), (5, 0));

    let views: Vec<u64> = app.state.events.snapshot_all().iter().map(|r| r.view).collect();
    assert_eq!(views, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn default_click_probability_clicks_about_half_the_views() {
    let app = setup(10, 0.5, Arc::new(NoLatency)).await;

    for _ in 0..1_000 {
        assert_eq!(get(&app.router, "/view/").await.0, StatusCode::OK);
    }

    let snap = app.state.counters.snapshot();
    assert_eq!(snap.view, 1_000);
    assert!((400..600).contains(&snap.click), "clicks out of range: {}", snap.click);
    assert_eq!(snap.click, Counters::get(&app.metrics.clicks));
}

#[tokio::test]
async fn nan_click_probability_does_not_break_views() {
    let app = setup(10, f64::NAN, Arc::new(NoLatency)).await;
    assert_eq!(app.click_probability, 0.5);

    for _ in 0..3 {
        assert_eq!(get(&app.router, "/view/").await.0, StatusCode::OK);
    }
    assert_eq!(app.state.counters.snapshot().view, 3);
}

#[tokio::test]
async fn latency_failure_returns_400_but_view_is_kept() {
    let app = setup(10, 1.0, Arc::new(FailingLatency)).await;

    let (status, body) = get(&app.router, "/view/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());

    let snap = app.state.counters.snapshot();
    assert_eq!(snap.view, 1);
    assert_eq!(snap.click, 0);
}

#[tokio::test]
async fn stats_before_any_flush_reports_no_data() {
    let app = setup(10, 0.5, Arc::new(NoLatency)).await;
    get(&app.router, "/view/").await;

    let (status, body) = get(&app.router, "/stats/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!("stats page\n{NO_DATA_TEXT}"));
}

#[tokio::test]
async fn stats_after_flush_reports_persisted_state() {
    let app = setup(10, 0.0, Arc::new(NoLatency)).await;

    for _ in 0..3 {
        get(&app.router, "/view/").await;
    }
    app.state.counters.record_click();
    app.sync.flush().await;

    // unflushed views are not visible through stats
    get(&app.router, "/view/").await;

    let (status, body) = get(&app.router, "/stats/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("stats page\nView: 3 \n Click: 1\n"), "unexpected body: {body}");
    assert_eq!(body.matches(" \n date: ").count(), 3);
}

#[tokio::test]
async fn stats_is_gated_until_refill() {
    let app = setup(10, 0.5, Arc::new(NoLatency)).await;

    let mut statuses = Vec::new();
    for _ in 0..12 {
        statuses.push(get(&app.router, "/stats/").await);
    }

    assert!(statuses[..10].iter().all(|(s, _)| *s == StatusCode::OK));
    for (status, body) in &statuses[10..] {
        assert_eq!(*status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, RATE_LIMITED_TEXT);
    }
    assert_eq!(Counters::get(&app.metrics.stats_denied), 2);

    app.state.gate.refill();
    assert_eq!(get(&app.router, "/stats/").await.0, StatusCode::OK);
}

#[tokio::test]
async fn views_do_not_consume_stats_tokens() {
    let app = setup(1, 0.5, Arc::new(NoLatency)).await;

    for _ in 0..5 {
        get(&app.router, "/view/").await;
    }

    assert_eq!(app.state.gate.remaining(), 1);
    assert_eq!(get(&app.router, "/stats/").await.0, StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_views_are_all_counted() {
    let app = setup(10, 0.5, Arc::new(NoLatency)).await;

    let mut handles = Vec::new();
    for _ in 0..100 {
        let router = app.router.clone();
        handles.push(tokio::spawn(async move { get(&router, "/view/").await.0 }));
    }
    for h in futures::future::join_all(handles).await {
        assert_eq!(h.unwrap(), StatusCode::OK);
    }

    let snap = app.state.counters.snapshot();
    assert_eq!(snap.view, 100);
    assert_eq!(app.state.events.len(), 100);
    assert_eq!(snap.click, Counters::get(&app.metrics.clicks));
}
