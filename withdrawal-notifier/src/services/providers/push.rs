use super::google_auth::{
    AccessTokenSource, ServiceAccountKey, ServiceAccountTokenSource, StaticToken,
};
use super::{ProviderError, ProviderResponse, PushProvider};
use crate::config::FcmConfig;
use crate::models::{NotificationPayload, PushTarget};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

const FCM_API_URL: &str = "https://fcm.googleapis.com/v1/projects";

pub struct FcmProvider {
    enabled: bool,
    project_id: String,
    tokens: Arc<dyn AccessTokenSource>,
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<&'a str>,
    notification: FcmNotification<'a>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    name: Option<String>,
    #[serde(default)]
    error: Option<FcmError>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct FcmError {
    code: i32,
    message: String,
    status: String,
}

impl<'a> FcmRequest<'a> {
    fn from_payload(payload: &'a NotificationPayload) -> Self {
        let (token, topic) = match &payload.target {
            PushTarget::Token(token) => (Some(token.as_str()), None),
            PushTarget::Topic(topic) => (None, Some(topic.as_str())),
        };

        Self {
            message: FcmMessage {
                token,
                topic,
                notification: FcmNotification {
                    title: &payload.title,
                    body: &payload.body,
                },
            },
        }
    }
}

impl FcmProvider {
    pub fn new(config: FcmConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(config, FCM_API_URL)
    }

    /// Point the provider at a different API root, e.g. a local stub.
    ///
    /// A non-empty `access_token` is used as-is; otherwise tokens are minted
    /// from `service_account_key` and refreshed before they expire.
    pub fn with_base_url(
        config: FcmConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        if !config.access_token.is_empty() {
            let tokens = Arc::new(StaticToken::new(config.access_token.clone()));
            return Ok(Self::with_token_source(config, base_url, tokens));
        }

        if config.service_account_key.is_empty() {
            return Err(ProviderError::Configuration(
                "FCM needs either an access token or a service account key".to_string(),
            ));
        }

        let source = ServiceAccountTokenSource::new(ServiceAccountKey::load(
            &config.service_account_key,
        )?)?;

        let mut config = config;
        if config.project_id.is_empty() {
            config.project_id = source.project_id().unwrap_or_default().to_string();
        }

        Ok(Self::with_token_source(config, base_url, Arc::new(source)))
    }

    pub fn with_token_source(
        config: FcmConfig,
        base_url: impl Into<String>,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Self {
        Self {
            enabled: config.enabled,
            project_id: config.project_id,
            tokens,
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn ensure_project(&self) -> Result<(), ProviderError> {
        if self.project_id.is_empty() {
            return Err(ProviderError::Configuration(
                "FCM project_id is not configured".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PushProvider for FcmProvider {
    async fn send(&self, payload: &NotificationPayload) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotEnabled(
                "FCM push provider is not enabled".to_string(),
            ));
        }

        self.ensure_project()?;

        let access_token = self.tokens.access_token().await?;
        let request = FcmRequest::from_payload(payload);
        let url = format!("{}/{}/messages:send", self.base_url, self.project_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(format!("Failed to connect to FCM: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            if status == StatusCode::UNAUTHORIZED {
                // Revoked or expired early; the next send mints a new token.
                self.tokens.invalidate().await;
            }
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::SendFailed(format!(
                "FCM API returned error status {}: {}",
                status, body
            )));
        }

        let fcm_response: FcmResponse = response.json().await.map_err(|e| {
            ProviderError::SendFailed(format!("Failed to parse FCM response: {}", e))
        })?;

        if let Some(error) = fcm_response.error {
            return Err(ProviderError::SendFailed(format!(
                "FCM error ({}): {}",
                error.status, error.message
            )));
        }

        tracing::debug!(
            target_kind = payload.target.kind(),
            message_name = ?fcm_response.name,
            "FCM accepted message"
        );

        Ok(ProviderResponse::success(fcm_response.name))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if !self.enabled {
            return Ok(());
        }

        self.ensure_project()?;
        self.tokens.access_token().await.map(|_| ())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Push provider that records payloads instead of delivering them.
///
/// Used when FCM is disabled and as the substitutable handle in tests.
pub struct MockPushProvider {
    enabled: bool,
    failing: AtomicBool,
    send_count: AtomicU64,
    sent: Mutex<Vec<NotificationPayload>>,
}

impl MockPushProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            failing: AtomicBool::new(false),
            send_count: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Make every subsequent send fail with `SendFailed`.
    pub fn fail_sends(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of send attempts, including failed ones.
    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Payloads that were accepted.
    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PushProvider for MockPushProvider {
    async fn send(&self, payload: &NotificationPayload) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotEnabled(
                "Mock push provider is not enabled".to_string(),
            ));
        }

        let attempt = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;

        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::SendFailed(
                "mock push provider configured to fail".to_string(),
            ));
        }

        tracing::info!(
            push_target = %payload.target,
            title = %payload.title,
            "[MOCK] Push notification would be sent"
        );

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(payload.clone());
        }

        Ok(ProviderResponse::success(Some(format!(
            "mock-push-{}",
            attempt
        ))))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
