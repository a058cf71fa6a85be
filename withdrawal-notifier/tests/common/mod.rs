use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use withdrawal_notifier::config::{
    FcmConfig, MongoConfig, NotificationSettings, NotifierConfig,
};
use withdrawal_notifier::models::UserAccount;
use withdrawal_notifier::services::{InMemoryUserDirectory, MockPushProvider};
use withdrawal_notifier::startup::{AppState, Application};

pub struct TestApp {
    pub address: String,
    pub directory: Arc<InMemoryUserDirectory>,
    pub push: Arc<MockPushProvider>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_users(vec![]).await
    }

    pub async fn spawn_with_users(users: Vec<UserAccount>) -> Self {
        // Use random port for testing (port 0)
        let config = NotifierConfig {
            common: CoreConfig {
                port: 0,
                ..CoreConfig::default()
            },
            mongodb: MongoConfig {
                uri: "mongodb://unused".to_string(),
                database: "unused".to_string(),
                users_collection: "users".to_string(),
            },
            fcm: FcmConfig {
                project_id: "test-project".to_string(),
                access_token: "test-token".to_string(),
                service_account_key: String::new(),
                enabled: false, // Use mock
            },
            notifications: NotificationSettings::default(),
        };

        let directory = Arc::new(InMemoryUserDirectory::with_users(users));
        let push = Arc::new(MockPushProvider::new(true));
        let state = AppState::new(config, directory.clone(), push.clone());

        let app = Application::with_state(state)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            directory,
            push,
            client,
        }
    }

    pub async fn post_created(
        &self,
        request_id: &str,
        body: serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(format!(
                "{}/triggers/withdrawals/{}/created",
                self.address, request_id
            ))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_updated(
        &self,
        request_id: &str,
        body: serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(format!(
                "{}/triggers/withdrawals/{}/updated",
                self.address, request_id
            ))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
