use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::ai::{AnalysisGateway, StockContext};
use crate::db::mover_repo;
use crate::errors::AppError;
use crate::market::{self, MarketSnapshot, ScanConfig};
use crate::models::{Catalyst, MoverStatus, NewTrackedMover, TrackedMover, UsageContext};

#[derive(Debug)]
pub enum TrackOutcome {
    Created(TrackedMover),
    /// Symbol was already tracked for today's session; nothing inserted.
    AlreadyTracked(TrackedMover),
}

/// Counters from one batch analysis pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisRunSummary {
    pub analyzed: usize,
    pub failed: usize,
}

/// Context handed to the analyst for a stored mover.
pub fn stock_context(mover: &TrackedMover) -> StockContext {
    StockContext {
        symbol: mover.symbol.clone(),
        company_name: mover.company_name.clone(),
        headline: mover.news_headline.clone().unwrap_or_default(),
        news_source: mover.news_source.clone(),
        movement_percent: mover.movement_percent,
    }
}

/// Track a mover once per symbol per trade date (today, UTC).
pub async fn track_mover(pool: &PgPool, new: &NewTrackedMover) -> Result<TrackOutcome, AppError> {
    track_mover_on(pool, new, Utc::now().date_naive()).await
}

/// Same as [`track_mover`] for an explicit trade date. The lookup and the
/// insert use the same date.
pub async fn track_mover_on(
    pool: &PgPool,
    new: &NewTrackedMover,
    trade_date: NaiveDate,
) -> Result<TrackOutcome, AppError> {
    if new.symbol.is_empty() {
        return Err(AppError::BadRequest("symbol is required".into()));
    }

    if let Some(existing) = mover_repo::find_for_trade_date(pool, &new.symbol, trade_date).await? {
        tracing::info!(symbol = %new.symbol, id = %existing.id, "Already tracked today, skipping");
        return Ok(TrackOutcome::AlreadyTracked(existing));
    }

    let mover = mover_repo::insert_mover(pool, new, trade_date).await?;
    tracing::info!(
        symbol = %mover.symbol,
        id = %mover.id,
        rvol = ?mover.relative_volume_ratio,
        spread = ?mover.spread_percent,
        "Tracked new mover"
    );
    Ok(TrackOutcome::Created(mover))
}

/// Scanner path: derive metrics from a raw snapshot and track it.
pub async fn track_snapshot(
    pool: &PgPool,
    snapshot: &MarketSnapshot,
    catalyst: Option<Catalyst>,
) -> Result<TrackOutcome, AppError> {
    track_mover(pool, &NewTrackedMover::from_snapshot(snapshot, catalyst)).await
}

/// Counters from one scan over a batch of snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub scanned: usize,
    /// Snapshots that met the threshold (after the limit).
    pub qualifying: usize,
    /// Movers tracked, or that would be tracked on a dry run.
    pub created: usize,
    /// Already tracked for the trade date.
    pub skipped: usize,
    pub failed: usize,
}

/// Pick the biggest movers out of `snapshots` and track each one with a
/// placeholder headline. A dry run only counts.
pub async fn scan_snapshots(
    pool: &PgPool,
    snapshots: &[MarketSnapshot],
    config: &ScanConfig,
) -> Result<ScanSummary, AppError> {
    let trade_date = Utc::now().date_naive();
    let picked = market::select_movers(snapshots, config.threshold, config.limit);

    let mut summary = ScanSummary {
        scanned: snapshots.len(),
        qualifying: picked.len(),
        ..ScanSummary::default()
    };
    tracing::info!(
        scanned = summary.scanned,
        qualifying = summary.qualifying,
        threshold = %config.threshold,
        dry_run = config.dry_run,
        "Scan selected movers"
    );

    for snapshot in picked {
        let new = NewTrackedMover::from_snapshot(snapshot, None);

        if config.dry_run {
            match mover_repo::find_for_trade_date(pool, &new.symbol, trade_date).await {
                Ok(Some(_)) => summary.skipped += 1,
                Ok(None) => summary.created += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(error = %e, symbol = %new.symbol, "Dry-run lookup failed");
                }
            }
            continue;
        }

        match track_mover_on(pool, &new, trade_date).await {
            Ok(TrackOutcome::Created(_)) => summary.created += 1,
            Ok(TrackOutcome::AlreadyTracked(_)) => summary.skipped += 1,
            Err(e) => {
                summary.failed += 1;
                tracing::error!(error = %e, symbol = %new.symbol, "Failed to track mover");
            }
        }
    }

    Ok(summary)
}

/// Ask the analyst about a mover and store the verdict. A fresh mover moves
/// to `researching`; later states are left alone.
pub async fn analyze_mover(
    pool: &PgPool,
    gateway: &AnalysisGateway,
    mover_id: Uuid,
    catalyst: Option<Catalyst>,
) -> Result<TrackedMover, AppError> {
    let mut mover = mover_repo::get_mover(pool, mover_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("mover {mover_id}")))?;

    if let Some(c) = catalyst.filter(|c| !c.headline.trim().is_empty()) {
        if mover.needs_catalyst() {
            mover = mover_repo::update_catalyst(pool, mover.id, &c).await?;
        }
    }

    let completion = gateway
        .analyze_stock_opportunity(&stock_context(&mover), UsageContext::Mover(mover.id))
        .await?;
    let verdict = completion.output;

    let mut mover =
        mover_repo::update_analysis(pool, mover.id, &verdict.analysis, verdict.sentiment).await?;

    if mover.status() == MoverStatus::Identified {
        mover = mover_repo::update_status(pool, mover.id, MoverStatus::Researching).await?;
    }

    tracing::info!(
        symbol = %mover.symbol,
        sentiment = %verdict.sentiment,
        valid = verdict.valid,
        "Mover analyzed"
    );
    Ok(mover)
}

/// Analyze every mover still in `identified`. A failed call is logged and
/// counted; the rest of the batch still runs.
pub async fn analyze_identified_movers(
    pool: &PgPool,
    gateway: &AnalysisGateway,
    limit: i64,
) -> Result<AnalysisRunSummary, AppError> {
    let movers = mover_repo::list_movers(pool, Some(MoverStatus::Identified), limit).await?;
    let mut summary = AnalysisRunSummary::default();

    for mover in movers {
        match analyze_mover(pool, gateway, mover.id, None).await {
            Ok(_) => summary.analyzed += 1,
            Err(e) => {
                summary.failed += 1;
                tracing::error!(error = %e, symbol = %mover.symbol, "Mover analysis failed");
            }
        }
    }

    Ok(summary)
}

/// Move a mover along its lifecycle. Backward moves are rejected.
pub async fn transition_status(
    pool: &PgPool,
    mover_id: Uuid,
    next: MoverStatus,
) -> Result<TrackedMover, AppError> {
    let mover = mover_repo::get_mover(pool, mover_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("mover {mover_id}")))?;

    let current = mover.status();
    if current == next {
        return Ok(mover);
    }
    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "cannot move mover from {current} to {next}"
        )));
    }

    Ok(mover_repo::update_status(pool, mover_id, next).await?)
}

/// Record entry/exit fills; profit/loss follows when both are known.
pub async fn record_trade_prices(
    pool: &PgPool,
    mover_id: Uuid,
    entry_price: Option<Decimal>,
    exit_price: Option<Decimal>,
) -> Result<TrackedMover, AppError> {
    let mover = mover_repo::get_mover(pool, mover_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("mover {mover_id}")))?;

    let entry = entry_price.or(mover.entry_price);
    let exit = exit_price.or(mover.exit_price);
    let pnl = market::profit_loss(entry, exit);

    Ok(mover_repo::update_trade_prices(pool, mover_id, entry, exit, pnl).await?)
}
