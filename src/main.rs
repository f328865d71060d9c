use std::sync::Arc;

use premarket_desk::ai::{format_cost, AnalysisGateway, ClientKind};
use premarket_desk::config::AppConfig;
use premarket_desk::db::{self, usage_repo, PgUsageLedger};
use premarket_desk::market::MarketSnapshot;
use premarket_desk::metrics::init_metrics;
use premarket_desk::services::movers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let metrics_handle = init_metrics()?;

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("Database connected");

    let ledger = Arc::new(PgUsageLedger::new(pool.clone()));
    let gateway = AnalysisGateway::from_config(&config.ai, ledger);

    match gateway.client().kind() {
        ClientKind::Live => tracing::info!(base_url = %config.ai.base_url, "Using live analysis client"),
        ClientKind::Stub if !config.ai.use_stub => {
            tracing::warn!("USE_STUB_AI=false but ANTHROPIC_API_KEY is missing; falling back to stub client")
        }
        ClientKind::Stub => tracing::info!("Using stub analysis client"),
    }

    if let Some(path) = &config.scan_snapshots_path {
        let raw = tokio::fs::read_to_string(path).await?;
        let snapshots: Vec<MarketSnapshot> = serde_json::from_str(&raw)?;

        let scan = movers::scan_snapshots(&pool, &snapshots, &config.scan).await?;
        tracing::info!(
            path = %path.display(),
            scanned = scan.scanned,
            qualifying = scan.qualifying,
            created = scan.created,
            skipped = scan.skipped,
            failed = scan.failed,
            dry_run = config.scan.dry_run,
            "Scan complete"
        );
    }

    let summary =
        movers::analyze_identified_movers(&pool, &gateway, config.analyze_batch_limit).await?;
    tracing::info!(
        analyzed = summary.analyzed,
        failed = summary.failed,
        "Mover analysis pass complete"
    );

    for total in usage_repo::get_totals_by_model(&pool).await? {
        tracing::info!(
            model = %total.model,
            calls = total.calls,
            tokens = total.total_tokens,
            cost = %format_cost(total.total_cost),
            "AI usage to date"
        );
    }
    let total_cost = usage_repo::get_total_cost(&pool).await?;
    tracing::info!(cost = %format_cost(total_cost), "Total estimated AI spend");

    tracing::debug!(metrics = %metrics_handle.render(), "Metrics snapshot");

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();
}
