//! Metrics collection for withdrawal-notifier.
//!
//! Trigger outcomes and push sends are tracked in a dedicated Prometheus
//! registry; HTTP request metrics go through the `metrics` recorder.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static WITHDRAWAL_EVENTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static PUSH_SENDS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize metrics collection. Calling it again is a no-op.
pub fn init_metrics() -> Result<(), anyhow::Error> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = METRICS_HANDLE.set(handle);

    let registry = Registry::new();

    let events_counter = IntCounterVec::new(
        Opts::new(
            "withdrawal_events_total",
            "Withdrawal trigger events handled, by trigger and outcome",
        ),
        &["trigger", "outcome"],
    )?;

    let sends_counter = IntCounterVec::new(
        Opts::new(
            "push_sends_total",
            "Push notification send attempts, by target kind and status",
        ),
        &["target", "status"],
    )?;

    registry.register(Box::new(events_counter.clone()))?;
    registry.register(Box::new(sends_counter.clone()))?;

    let _ = PROMETHEUS_REGISTRY.set(registry);
    let _ = WITHDRAWAL_EVENTS_TOTAL.set(events_counter);
    let _ = PUSH_SENDS_TOTAL.set(sends_counter);

    Ok(())
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// Record the outcome of one trigger invocation.
pub fn record_event(trigger: &str, outcome: &str) {
    if let Some(counter) = WITHDRAWAL_EVENTS_TOTAL.get() {
        counter.with_label_values(&[trigger, outcome]).inc();
    }
}

/// Record a push send attempt.
pub fn record_push_send(target: &str, status: &str) {
    if let Some(counter) = PUSH_SENDS_TOTAL.get() {
        counter.with_label_values(&[target, status]).inc();
    }
}
