use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Catalyst, MoverStatus, NewTrackedMover, Sentiment, TrackedMover};

/// Insert a new mover in the `identified` state for `trade_date`.
pub async fn insert_mover(
    pool: &PgPool,
    mover: &NewTrackedMover,
    trade_date: NaiveDate,
) -> anyhow::Result<TrackedMover> {
    let row = sqlx::query_as::<_, TrackedMover>(
        r#"
        INSERT INTO tracked_movers
            (symbol, company_name, news_headline, news_source, news_url, movement_percent,
             pre_market_price, pre_market_volume, average_volume, relative_volume_ratio,
             spread_percent, trade_date, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'identified')
        RETURNING *
        "#,
    )
    .bind(&mover.symbol)
    .bind(&mover.company_name)
    .bind(&mover.news_headline)
    .bind(&mover.news_source)
    .bind(&mover.news_url)
    .bind(mover.movement_percent)
    .bind(mover.pre_market_price)
    .bind(mover.pre_market_volume)
    .bind(mover.average_volume)
    .bind(mover.relative_volume_ratio)
    .bind(mover.spread_percent)
    .bind(trade_date)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn get_mover(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<TrackedMover>> {
    let mover = sqlx::query_as::<_, TrackedMover>("SELECT * FROM tracked_movers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(mover)
}

/// The mover already tracked for `symbol` on `trade_date`, if any.
pub async fn find_for_trade_date(
    pool: &PgPool,
    symbol: &str,
    trade_date: NaiveDate,
) -> anyhow::Result<Option<TrackedMover>> {
    let mover = sqlx::query_as::<_, TrackedMover>(
        r#"
        SELECT * FROM tracked_movers
        WHERE symbol = $1 AND trade_date = $2
        ORDER BY identified_at DESC
        LIMIT 1
        "#,
    )
    .bind(symbol)
    .bind(trade_date)
    .fetch_optional(pool)
    .await?;

    Ok(mover)
}

/// Movers newest first, optionally filtered by status.
pub async fn list_movers(
    pool: &PgPool,
    status: Option<MoverStatus>,
    limit: i64,
) -> anyhow::Result<Vec<TrackedMover>> {
    let movers = sqlx::query_as::<_, TrackedMover>(
        r#"
        SELECT * FROM tracked_movers
        WHERE ($1::TEXT IS NULL OR status = $1)
        ORDER BY identified_at DESC
        LIMIT $2
        "#,
    )
    .bind(status.map(|s| s.as_str()))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(movers)
}

/// Store the AI verdict on a mover. Status is not touched here.
pub async fn update_analysis(
    pool: &PgPool,
    id: Uuid,
    analysis: &str,
    sentiment: Sentiment,
) -> anyhow::Result<TrackedMover> {
    let mover = sqlx::query_as::<_, TrackedMover>(
        r#"
        UPDATE tracked_movers
        SET ai_analysis = $2, sentiment = $3
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(analysis)
    .bind(sentiment.as_str())
    .fetch_one(pool)
    .await?;

    Ok(mover)
}

pub async fn update_catalyst(pool: &PgPool, id: Uuid, catalyst: &Catalyst) -> anyhow::Result<TrackedMover> {
    let mover = sqlx::query_as::<_, TrackedMover>(
        r#"
        UPDATE tracked_movers
        SET news_headline = $2, news_source = $3, news_url = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&catalyst.headline)
    .bind(&catalyst.source)
    .bind(&catalyst.url)
    .fetch_one(pool)
    .await?;

    Ok(mover)
}

/// Write a status change. Callers validate the lifecycle first; moving to
/// `executed` stamps `executed_at` once.
pub async fn update_status(pool: &PgPool, id: Uuid, status: MoverStatus) -> anyhow::Result<TrackedMover> {
    let mover = sqlx::query_as::<_, TrackedMover>(
        r#"
        UPDATE tracked_movers
        SET status = $2,
            executed_at = CASE
                WHEN $2 = 'executed' THEN COALESCE(executed_at, NOW())
                ELSE executed_at
            END
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .fetch_one(pool)
    .await?;

    Ok(mover)
}

pub async fn update_trade_prices(
    pool: &PgPool,
    id: Uuid,
    entry_price: Option<Decimal>,
    exit_price: Option<Decimal>,
    profit_loss: Option<Decimal>,
) -> anyhow::Result<TrackedMover> {
    let mover = sqlx::query_as::<_, TrackedMover>(
        r#"
        UPDATE tracked_movers
        SET entry_price = $2, exit_price = $3, profit_loss = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(entry_price)
    .bind(exit_price)
    .bind(profit_loss)
    .fetch_one(pool)
    .await?;

    Ok(mover)
}

pub async fn update_strategy_notes(pool: &PgPool, id: Uuid, notes: &str) -> anyhow::Result<TrackedMover> {
    let mover = sqlx::query_as::<_, TrackedMover>(
        "UPDATE tracked_movers SET strategy_notes = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(notes)
    .fetch_one(pool)
    .await?;

    Ok(mover)
}

/// Returns true if a row was removed.
pub async fn delete_mover(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM tracked_movers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
