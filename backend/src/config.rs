use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: String,

    /// Database connection string for the aggregate row.
    pub database_url: String,

    /// File the event log snapshot is written to on every flush.
    pub snapshot_path: String,

    // =========================
    // Background tasks
    // =========================
    /// Period of the persistence task.
    ///
    /// Each tick overwrites the snapshot file and updates the aggregate row.
    /// Anything recorded since the last tick is lost on a crash.
    pub flush_interval: Duration,

    /// Period of the admission gate refill task.
    ///
    /// The gate is reset to `stats_capacity` on every tick, regardless of
    /// how many tokens were left.
    pub refill_interval: Duration,

    /// Whether shutdown runs one last flush after the tasks are stopped.
    pub flush_on_shutdown: bool,

    // =========================
    // Request handling
    // =========================
    /// Number of `/stats/` requests admitted per refill period.
    pub stats_capacity: usize,

    /// Upper bound of the simulated downstream latency on `/view/`.
    pub view_max_delay: Duration,

    /// Probability that a view also records a click. Clamped to [0, 1]; a
    /// non-finite value falls back to the default.
    pub click_probability: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_url: "sqlite://mock_store.db?mode=rwc".to_string(),
            snapshot_path: "mock_store.json".to_string(),
            flush_interval: Duration::from_secs(5),
            refill_interval: Duration::from_secs(10),
            flush_on_shutdown: false,
            stats_capacity: 10,
            view_max_delay: Duration::from_millis(50),
            click_probability: 0.5,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let d = Self::default();

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(d.bind_addr),
            database_url: std::env::var("DATABASE_URL").unwrap_or(d.database_url),
            snapshot_path: std::env::var("SNAPSHOT_PATH").unwrap_or(d.snapshot_path),

            flush_interval: env_millis("FLUSH_INTERVAL_MS", d.flush_interval),
            refill_interval: env_millis("REFILL_INTERVAL_MS", d.refill_interval),
            flush_on_shutdown: env_parse("FLUSH_ON_SHUTDOWN", d.flush_on_shutdown),

            stats_capacity: env_parse("STATS_CAPACITY", d.stats_capacity),
            view_max_delay: env_millis("VIEW_MAX_DELAY_MS", d.view_max_delay),
            click_probability: probability_or(
                env_parse("CLICK_PROBABILITY", d.click_probability),
                d.click_probability,
            ),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, default = ?default, "invalid config value; using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Clamps `p` into [0, 1]. Non-finite values (NaN, infinities) fall back to
/// `default`, since `clamp` passes NaN through.
pub fn probability_or(p: f64, default: f64) -> f64 {
    if !p.is_finite() {
        tracing::warn!(value = p, default, "non-finite probability; using default");
        return default.clamp(0.0, 1.0);
    }
    p.clamp(0.0, 1.0)
}

fn env_millis(key: &str, default: Duration) -> Duration {
    let ms = env_parse(key, default.as_millis() as u64);
    // tokio intervals panic on a zero period
    Duration::from_millis(ms.max(1))
}
