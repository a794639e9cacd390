use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{AnyPool, Row};

use crate::db::schema::AGGREGATE_ROW_ID;
use crate::error::AppError;
use crate::sink::{Aggregate, AggregateRepository};

/// SQLx-backed aggregate row.
/// Responsible only for persistence and row mapping.
pub struct SqlxAggregateRepository {
    pool: AnyPool,
}

impl SqlxAggregateRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AggregateRepository for SqlxAggregateRepository {
    async fn update(&self, totals: Aggregate) -> anyhow::Result<()> {
        let res = sqlx::query(
            r#"
UPDATE counters
SET view = ?,
    click = ?
WHERE id = ?;
"#,
        )
        .bind(u64_to_i64(totals.view)?)
        .bind(u64_to_i64(totals.click)?)
        .bind(AGGREGATE_ROW_ID)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(AppError::AggregateRowMissing(AGGREGATE_ROW_ID).into());
        }

        Ok(())
    }

    async fn fetch(&self) -> anyhow::Result<Option<Aggregate>> {
        let row = sqlx::query(r#"SELECT view, click FROM counters WHERE id = ?;"#)
            .bind(AGGREGATE_ROW_ID)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(Aggregate {
                view: i64_to_u64(r.try_get::<Option<i64>, _>("view")?.unwrap_or(0))?,
                click: i64_to_u64(r.try_get::<Option<i64>, _>("click")?.unwrap_or(0))?,
            })),
            None => Ok(None),
        }
    }
}

/* =========================
Numeric safety helpers
========================= */

fn i64_to_u64(v: i64) -> anyhow::Result<u64> {
    if v < 0 {
        return Err(anyhow!(AppError::AggregateRange(format!(
            "negative i64 where u64 expected: {v}"
        ))));
    }
    Ok(v as u64)
}

fn u64_to_i64(v: u64) -> anyhow::Result<i64> {
    if v > i64::MAX as u64 {
        return Err(anyhow!(AppError::AggregateRange(format!(
            "u64 too large for i64: {v}"
        ))));
    }
    Ok(v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_helpers_reject_out_of_range() {
        assert!(i64_to_u64(-1).is_err());
        assert!(u64_to_i64(u64::MAX).is_err());
        assert_eq!(i64_to_u64(7).unwrap(), 7);
        assert_eq!(u64_to_i64(7).unwrap(), 7);
    }
}
