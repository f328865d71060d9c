mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use metrics_exporter_prometheus::PrometheusBuilder;
use rust_decimal::Decimal;
use uuid::Uuid;

use premarket_desk::ai::live::{DEFAULT_MODEL, FAST_MODEL};
use premarket_desk::ai::{
    AnalysisGateway, ClarificationAnswer, ClientKind, MemoryUsageLedger, StockContext, UsageLedger,
};
use premarket_desk::config::AiConfig;
use premarket_desk::errors::{AnalysisError, GatewayError};
use premarket_desk::models::{NewUsageEntry, Sentiment, UsageContext, UsageLogEntry};

fn live_config(base_url: &str) -> AiConfig {
    AiConfig {
        use_stub: false,
        api_key: Some("sk-test".into()),
        base_url: base_url.into(),
        timeout: Duration::from_secs(5),
    }
}

fn live_gateway(base_url: &str) -> (AnalysisGateway, Arc<MemoryUsageLedger>) {
    let ledger = Arc::new(MemoryUsageLedger::new());
    let gateway = AnalysisGateway::from_config(&live_config(base_url), ledger.clone());
    assert_eq!(gateway.client().kind(), ClientKind::Live);
    (gateway, ledger)
}

fn stub_gateway() -> (AnalysisGateway, Arc<MemoryUsageLedger>) {
    let ledger = Arc::new(MemoryUsageLedger::new());
    let gateway = AnalysisGateway::from_config(&AiConfig::stub(), ledger.clone());
    (gateway, ledger)
}

fn context() -> StockContext {
    StockContext::new("ACME", "ACME wins FDA approval for lead candidate")
}

struct FailingLedger;

#[async_trait]
impl UsageLedger for FailingLedger {
    async fn append(&self, _entry: NewUsageEntry) -> anyhow::Result<UsageLogEntry> {
        anyhow::bail!("ledger offline")
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(0)
    }
}

#[tokio::test]
async fn test_live_analysis_records_provider_tokens() {
    let text = r#"{"valid": true, "analysis": "Approval is a real catalyst.", "sentiment": "Bullish"}"#;
    let base = common::spawn_completion_api(StatusCode::OK, common::messages_body(text, 1000, 500)).await;
    let (gateway, ledger) = live_gateway(&base);
    let mover_id = Uuid::new_v4();

    let completion = gateway
        .analyze_stock_opportunity(&context(), UsageContext::Mover(mover_id))
        .await
        .unwrap();

    assert!(completion.output.valid);
    assert_eq!(completion.output.sentiment, Sentiment::Bullish);
    assert_eq!(completion.request_id.as_deref(), Some("msg_test_001"));

    let entries = ledger.entries().await;
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.endpoint, "analyze");
    assert_eq!(entry.model, DEFAULT_MODEL);
    assert_eq!(entry.prompt_tokens, 1000);
    assert_eq!(entry.completion_tokens, 500);
    assert_eq!(entry.total_tokens, 1500);
    // 1000 * $3/M + 500 * $15/M
    assert_eq!(entry.cost_estimate, Decimal::new(105, 4));
    assert_eq!(entry.mover_id, Some(mover_id));
    assert_eq!(entry.session_id, None);
}

#[tokio::test]
async fn test_live_clarifications_accept_fenced_json() {
    let text = "```json\n[\"What is your time horizon?\", \"How much risk can you take?\"]\n```";
    let base = common::spawn_completion_api(StatusCode::OK, common::messages_body(text, 120, 40)).await;
    let (gateway, ledger) = live_gateway(&base);
    let session_id = Uuid::new_v4();

    let completion = gateway
        .generate_clarifications("Should I buy bonds?", UsageContext::Session(session_id))
        .await
        .unwrap();

    assert_eq!(completion.output.len(), 2);
    let entries = ledger.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].endpoint, "clarify");
    assert_eq!(entries[0].model, FAST_MODEL);
    assert_eq!(entries[0].session_id, Some(session_id));
}

#[tokio::test]
async fn test_upstream_status_error_leaves_ledger_untouched() {
    let base = common::spawn_completion_api(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"type":"error","error":{"type":"api_error","message":"overloaded"}}"#.into(),
    )
    .await;
    let (gateway, ledger) = live_gateway(&base);

    let err = gateway
        .analyze_stock_opportunity(&context(), UsageContext::Unlinked)
        .await
        .unwrap_err();

    match err {
        GatewayError::Analysis(AnalysisError::Upstream(msg)) => assert!(msg.contains("500")),
        other => panic!("expected upstream error, got {other:?}"),
    }
    assert_eq!(ledger.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_garbage_envelope_is_parse_error() {
    let base = common::spawn_completion_api(StatusCode::OK, "<html>not json</html>".into()).await;
    let (gateway, ledger) = live_gateway(&base);

    let err = gateway
        .validate_question("Is now a good time to rebalance?", UsageContext::Unlinked)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Analysis(AnalysisError::Parse(_))));
    assert_eq!(ledger.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unexpected_payload_shape_is_parse_error() {
    let base = common::spawn_completion_api(
        StatusCode::OK,
        common::messages_body("I think you should diversify.", 80, 20),
    )
    .await;
    let (gateway, ledger) = live_gateway(&base);

    let err = gateway
        .generate_research_response(
            "Should I buy bonds?",
            &[ClarificationAnswer {
                question: "Horizon?".into(),
                answer: "10 years".into(),
            }],
            UsageContext::Unlinked,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Analysis(AnalysisError::Parse(_))));
    assert_eq!(ledger.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_sentiment_is_parse_error() {
    let text = r#"{"valid": true, "analysis": "Hard to say.", "sentiment": "sideways"}"#;
    let base = common::spawn_completion_api(StatusCode::OK, common::messages_body(text, 300, 60)).await;
    let (gateway, ledger) = live_gateway(&base);

    let err = gateway
        .analyze_stock_opportunity(&context(), UsageContext::Unlinked)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Analysis(AnalysisError::Parse(_))));
    assert_eq!(ledger.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unreachable_provider_is_upstream_error() {
    let (gateway, ledger) = live_gateway("http://127.0.0.1:1");

    let err = gateway
        .generate_clarifications("Should I buy bonds?", UsageContext::Unlinked)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Analysis(AnalysisError::Upstream(_))));
    assert_eq!(ledger.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_timeout_is_upstream_error() {
    let text = r#"{"valid": true, "analysis": "Too late.", "sentiment": "bullish"}"#;
    let base = common::spawn_slow_completion_api(
        Duration::from_secs(3),
        common::messages_body(text, 100, 20),
    )
    .await;

    let ledger = Arc::new(MemoryUsageLedger::new());
    let config = AiConfig {
        timeout: Duration::from_millis(200),
        ..live_config(&base)
    };
    let gateway = AnalysisGateway::from_config(&config, ledger.clone());

    let err = gateway
        .analyze_stock_opportunity(&context(), UsageContext::Unlinked)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Analysis(AnalysisError::Upstream(_))));
    assert_eq!(ledger.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_stub_analysis_records_fixed_usage() {
    let (gateway, ledger) = stub_gateway();
    assert!(gateway.client().is_stub());
    let mover_id = Uuid::new_v4();

    let completion = gateway
        .analyze_stock_opportunity(&context(), UsageContext::Mover(mover_id))
        .await
        .unwrap();
    assert!(completion.output.valid);
    assert_eq!(completion.output.sentiment, Sentiment::Neutral);

    let entries = ledger.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].model, "stub");
    assert_eq!(entries[0].prompt_tokens, 200);
    assert_eq!(entries[0].completion_tokens, 100);
    assert_eq!(entries[0].total_tokens, 300);
    assert_eq!(entries[0].cost_estimate, Decimal::ZERO);
    assert_eq!(entries[0].mover_id, Some(mover_id));
}

#[tokio::test]
async fn test_stub_is_deterministic_and_logs_every_call() {
    let (gateway, ledger) = stub_gateway();

    let first = gateway
        .generate_clarifications("Should I buy bonds?", UsageContext::Unlinked)
        .await
        .unwrap();
    let second = gateway
        .generate_clarifications("Should I buy bonds?", UsageContext::Unlinked)
        .await
        .unwrap();
    assert_eq!(first, second);

    let research = gateway
        .generate_research_response("Should I buy bonds?", &[], UsageContext::Unlinked)
        .await
        .unwrap();
    assert!(!research.output.summary.is_empty());
    assert!(!research.output.links.is_empty());

    let valid = gateway
        .validate_question("How should I rebalance my portfolio?", UsageContext::Unlinked)
        .await
        .unwrap();
    assert!(valid.output);

    let endpoints: Vec<String> = ledger.entries().await.into_iter().map(|e| e.endpoint).collect();
    assert_eq!(endpoints, vec!["clarify", "clarify", "respond", "validate"]);
}

#[tokio::test]
async fn test_missing_key_falls_back_to_stub() {
    let ledger = Arc::new(MemoryUsageLedger::new());
    let config = AiConfig {
        use_stub: false,
        api_key: Some("   ".into()),
        ..AiConfig::default()
    };

    let gateway = AnalysisGateway::from_config(&config, ledger.clone());
    assert_eq!(gateway.client().kind(), ClientKind::Stub);

    gateway
        .analyze_stock_opportunity(&context(), UsageContext::Unlinked)
        .await
        .unwrap();
    assert_eq!(ledger.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_ledger_failure_surfaces_as_ledger_error() {
    let gateway = AnalysisGateway::from_config(&AiConfig::stub(), Arc::new(FailingLedger));

    let err = gateway
        .analyze_stock_opportunity(&context(), UsageContext::Unlinked)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Ledger(_)));
}

#[test]
fn test_ledger_failure_is_counted() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let gateway = AnalysisGateway::from_config(&AiConfig::stub(), Arc::new(FailingLedger));
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let result = metrics::with_local_recorder(&recorder, || {
        rt.block_on(gateway.analyze_stock_opportunity(&context(), UsageContext::Unlinked))
    });

    assert!(matches!(result, Err(GatewayError::Ledger(_))));
    let rendered = handle.render();
    assert!(rendered.contains(r#"ai_ledger_failures_total{endpoint="analyze"} 1"#));
    assert!(!rendered.contains(r#"ai_calls_total{endpoint="analyze"} 1"#));
}
