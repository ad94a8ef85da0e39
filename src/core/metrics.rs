use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_questions_created(source: &'static str, count: usize) {
    metrics::counter!("questions_created_total", "source" => source).increment(count as u64);
}

pub(crate) fn record_llm_request(operation: &'static str, succeeded: bool) {
    let outcome = if succeeded { "success" } else { "failure" };
    metrics::counter!("llm_requests_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}
