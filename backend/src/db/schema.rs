use anyhow::Context;
use sqlx::AnyPool;

/// Id of the single aggregate row. It is written once by [`seed_aggregate`]
/// and only ever updated afterwards.
pub const AGGREGATE_ROW_ID: i64 = 1;

pub async fn migrate(pool: &AnyPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS counters (
  id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
  view INTEGER,
  click INTEGER
);
"#,
    )
    .execute(pool)
    .await
    .context("failed to create counters table")?;

    Ok(())
}

/// Creates the aggregate row with zero counts, or zeroes it if a previous
/// run left one behind. In-memory counters start at zero on every boot.
pub async fn seed_aggregate(pool: &AnyPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
INSERT INTO counters (id, view, click) VALUES (?, 0, 0)
ON CONFLICT (id) DO UPDATE SET view = 0, click = 0;
"#,
    )
    .bind(AGGREGATE_ROW_ID)
    .execute(pool)
    .await
    .context("failed to seed aggregate row")?;

    Ok(())
}
