use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::models::Endpoint;

/// Install the Prometheus recorder and pre-register the AI usage counters.
/// `render()` on the returned handle produces the scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first call.
    for endpoint in Endpoint::ALL {
        counter!("ai_calls_total", "endpoint" => endpoint.as_str()).absolute(0);
        counter!("ai_call_failures_total", "endpoint" => endpoint.as_str()).absolute(0);
        counter!("ai_ledger_failures_total", "endpoint" => endpoint.as_str()).absolute(0);
    }

    Ok(handle)
}
