//! Prometheus metrics
//!
//! A recorder is installed once per process; `/metrics` renders it.

use std::sync::OnceLock;
use std::time::Duration;

use axum::{http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use avatar_assistant_agent::TurnOutcome;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

const REQUESTS_TOTAL: &str = "avatar_assistant_requests_total";
const STAGE_LATENCY: &str = "avatar_assistant_stage_latency_seconds";
const ERRORS_TOTAL: &str = "avatar_assistant_errors_total";

/// Install the Prometheus recorder
pub fn init_metrics() -> Option<PrometheusHandle> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Some(handle.clone());
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = PROMETHEUS_HANDLE.set(handle.clone());
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Metrics recorder not initialized".to_string(),
        ),
    }
}

pub fn record_request(endpoint: &'static str, status: u16) {
    metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint, "status" => status.to_string())
        .increment(1);
}

fn record_stage_latency(stage: &'static str, elapsed: Duration) {
    metrics::histogram!(STAGE_LATENCY, "stage" => stage).record(elapsed.as_secs_f64());
}

pub fn record_llm_latency(elapsed: Duration) {
    record_stage_latency("llm", elapsed);
}

pub fn record_tts_latency(elapsed: Duration) {
    record_stage_latency("tts", elapsed);
}

pub fn record_avatar_latency(elapsed: Duration) {
    record_stage_latency("avatar", elapsed);
}

pub fn record_total_latency(elapsed: Duration) {
    record_stage_latency("turn", elapsed);
}

pub fn record_error(stage: &'static str) {
    metrics::counter!(ERRORS_TOTAL, "stage" => stage).increment(1);
}

/// Record latencies and failures of a completed turn
pub fn record_turn(outcome: &TurnOutcome) {
    let timings = &outcome.timings;
    record_llm_latency(timings.llm);
    if let Some(tts) = timings.tts {
        record_tts_latency(tts);
    }
    if let Some(avatar) = timings.avatar {
        record_avatar_latency(avatar);
    }
    record_total_latency(timings.total);

    for stage in &outcome.failures {
        record_error(stage.as_str());
    }
}
