use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::ai::ledger::{to_row, UsageLedger};
use crate::models::{ModelUsageTotal, NewUsageEntry, UsageLogEntry};

/// Append one entry to the usage ledger.
pub async fn insert_usage(pool: &PgPool, entry: &NewUsageEntry) -> anyhow::Result<UsageLogEntry> {
    let row = to_row(entry)?;

    let inserted = sqlx::query_as::<_, UsageLogEntry>(
        r#"
        INSERT INTO usage_log
            (id, endpoint, model, prompt_tokens, completion_tokens, total_tokens,
             cost_estimate, session_id, mover_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(row.id)
    .bind(&row.endpoint)
    .bind(&row.model)
    .bind(row.prompt_tokens)
    .bind(row.completion_tokens)
    .bind(row.total_tokens)
    .bind(row.cost_estimate)
    .bind(row.session_id)
    .bind(row.mover_id)
    .fetch_one(pool)
    .await?;

    Ok(inserted)
}

pub async fn count_usage(pool: &PgPool) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM usage_log")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

/// Most recent ledger entries, newest first.
pub async fn get_recent_usage(pool: &PgPool, limit: i64) -> anyhow::Result<Vec<UsageLogEntry>> {
    let entries = sqlx::query_as::<_, UsageLogEntry>(
        "SELECT * FROM usage_log ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub async fn get_usage_for_session(
    pool: &PgPool,
    session_id: Uuid,
) -> anyhow::Result<Vec<UsageLogEntry>> {
    let entries = sqlx::query_as::<_, UsageLogEntry>(
        "SELECT * FROM usage_log WHERE session_id = $1 ORDER BY created_at",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Calls, tokens and spend per model.
pub async fn get_totals_by_model(pool: &PgPool) -> anyhow::Result<Vec<ModelUsageTotal>> {
    let totals = sqlx::query_as::<_, ModelUsageTotal>(
        r#"
        SELECT model,
               COUNT(*) AS calls,
               COALESCE(SUM(total_tokens), 0)::BIGINT AS total_tokens,
               COALESCE(SUM(cost_estimate), 0) AS total_cost
        FROM usage_log
        GROUP BY model
        ORDER BY total_cost DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(totals)
}

/// Total estimated spend across the whole ledger.
pub async fn get_total_cost(pool: &PgPool) -> anyhow::Result<Decimal> {
    let row: (Option<Decimal>,) = sqlx::query_as("SELECT SUM(cost_estimate) FROM usage_log")
        .fetch_one(pool)
        .await?;

    Ok(row.0.unwrap_or(Decimal::ZERO))
}

/// Postgres-backed usage ledger.
#[derive(Debug, Clone)]
pub struct PgUsageLedger {
    pool: PgPool,
}

impl PgUsageLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageLedger for PgUsageLedger {
    async fn append(&self, entry: NewUsageEntry) -> anyhow::Result<UsageLogEntry> {
        insert_usage(&self.pool, &entry).await
    }

    async fn count(&self) -> anyhow::Result<i64> {
        count_usage(&self.pool).await
    }
}
