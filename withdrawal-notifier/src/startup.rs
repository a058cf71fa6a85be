//! Application startup and lifecycle management.
//!
//! Backing services are connected once in [`Application::build`]; the
//! resulting [`AppState`] is the only handle the trigger handlers see.

use crate::config::NotifierConfig;
use crate::handlers;
use crate::notifier::Notifier;
use crate::services::{
    FcmProvider, MockPushProvider, MongoUserDirectory, PushProvider, UserDirectory,
};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: NotifierConfig,
    pub notifier: Notifier,
    pub push_provider: Arc<dyn PushProvider>,
}

impl AppState {
    pub fn new(
        config: NotifierConfig,
        directory: Arc<dyn UserDirectory>,
        push_provider: Arc<dyn PushProvider>,
    ) -> Self {
        let notifier = Notifier::new(
            directory,
            push_provider.clone(),
            config.notifications.admin_topic.clone(),
        );
        Self {
            config,
            notifier,
            push_provider,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/triggers/withdrawals/:request_id/created",
            post(handlers::on_withdrawal_created),
        )
        .route(
            "/triggers/withdrawals/:request_id/updated",
            post(handlers::on_withdrawal_updated),
        )
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Connect backing services and bind the listener.
    pub async fn build(config: NotifierConfig) -> Result<Self, AppError> {
        let directory = MongoUserDirectory::connect(
            &config.mongodb.uri,
            &config.mongodb.database,
            &config.mongodb.users_collection,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect user directory: {}", e);
            e
        })?;

        let push_provider: Arc<dyn PushProvider> = if config.fcm.enabled {
            let provider = FcmProvider::new(config.fcm.clone()).map_err(|e| {
                tracing::error!("Failed to initialize FCM provider: {}", e);
                AppError::ConfigError(anyhow::anyhow!(e))
            })?;
            tracing::info!("FCM push provider initialized");
            Arc::new(provider)
        } else {
            tracing::info!("FCM provider disabled, using mock push provider");
            Arc::new(MockPushProvider::new(true))
        };

        let state = AppState::new(config, Arc::new(directory), push_provider);
        Self::with_state(state).await
    }

    /// Bind the listener around an already assembled state.
    pub async fn with_state(state: AppState) -> Result<Self, AppError> {
        // port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            admin_topic = %state.notifier.admin_topic(),
            push_enabled = state.push_provider.is_enabled(),
            "Withdrawal notifier listening on port {}",
            port
        );

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FcmConfig, MongoConfig, NotificationSettings};
    use crate::models::{PushTarget, UserAccount};
    use crate::services::InMemoryUserDirectory;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request as HttpRequest, StatusCode};
    use serde_json::{json, Value};
    use service_core::config::Config as CoreConfig;
    use tower::ServiceExt;

    fn config() -> NotifierConfig {
        NotifierConfig {
            common: CoreConfig::default(),
            mongodb: MongoConfig {
                uri: "mongodb://unused".to_string(),
                database: "unused".to_string(),
                users_collection: "users".to_string(),
            },
            fcm: FcmConfig {
                project_id: String::new(),
                access_token: String::new(),
                service_account_key: String::new(),
                enabled: false,
            },
            notifications: NotificationSettings::default(),
        }
    }

    fn router(
        users: Vec<UserAccount>,
    ) -> (Router, Arc<InMemoryUserDirectory>, Arc<MockPushProvider>) {
        let directory = Arc::new(InMemoryUserDirectory::with_users(users));
        let push = Arc::new(MockPushProvider::new(true));
        let state = AppState::new(config(), directory.clone(), push.clone());
        (build_router(state), directory, push)
    }

    fn post_json(uri: &str, body: Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_route_reports_service_name() {
        let (app, _, _) = router(vec![]);

        let response = app
            .oneshot(HttpRequest::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["service"], "withdrawal-notifier");
    }

    #[tokio::test]
    async fn ready_route_fails_while_directory_is_down() {
        let (app, directory, _) = router(vec![]);
        directory.set_unavailable(true);

        let response = app
            .oneshot(HttpRequest::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn created_route_broadcasts_and_acknowledges() {
        let (app, _, push) = router(vec![]);

        let response = app
            .oneshot(post_json(
                "/triggers/withdrawals/req-1/created",
                json!({ "value": { "susuAccountId": "ACC1", "amount": 50 } }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let sent = push.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].target, PushTarget::Topic("new_withdrawal".to_string()));
        assert_eq!(sent[0].body, "Account ACC1 has requested GH¢50.");
    }

    #[tokio::test]
    async fn updated_route_unicasts_to_owner() {
        let (app, directory, push) =
            router(vec![UserAccount::new("u1", "ACC1").with_fcm_token("TOK123")]);

        let response = app
            .oneshot(post_json(
                "/triggers/withdrawals/req-1/updated",
                json!({
                    "before": { "susuAccountId": "ACC1", "amount": 50, "status": "pending" },
                    "after": { "susuAccountId": "ACC1", "amount": 50, "status": "approved" }
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(directory.lookup_count(), 1);

        let sent = push.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].target, PushTarget::Token("TOK123".to_string()));
    }

    #[tokio::test]
    async fn malformed_envelope_is_rejected_before_handling() {
        let (app, directory, push) = router(vec![]);

        let response = app
            .oneshot(post_json(
                "/triggers/withdrawals/req-1/updated",
                json!({ "before": "not a snapshot" }),
            ))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        assert_eq!(directory.lookup_count(), 0);
        assert_eq!(push.send_count(), 0);
    }
}
