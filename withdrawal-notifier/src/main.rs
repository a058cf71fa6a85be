use service_core::observability::init_tracing;
use withdrawal_notifier::config::NotifierConfig;
use withdrawal_notifier::services::init_metrics;
use withdrawal_notifier::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = NotifierConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "withdrawal-notifier",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    );

    if let Err(e) = init_metrics() {
        tracing::warn!("Metrics recorder unavailable: {}", e);
    }

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start withdrawal-notifier: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
