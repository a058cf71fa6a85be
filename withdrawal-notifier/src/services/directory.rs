//! Read-only lookup of the user that owns a susu account.

use crate::models::UserAccount;
use async_trait::async_trait;
use mongodb::{bson::doc, Client as MongoClient, Collection};
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// First user whose `susuAccountId` equals `account_id`, if any.
    ///
    /// Account ids are expected to be unique per user but nothing enforces
    /// it; when several users share one, whichever the store returns first
    /// wins.
    async fn find_by_susu_account(&self, account_id: &str)
        -> Result<Option<UserAccount>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct MongoUserDirectory {
    client: MongoClient,
    users: Collection<UserAccount>,
}

impl MongoUserDirectory {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, collection = %collection, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let users = client.database(database).collection(collection);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, users })
    }
}

#[async_trait]
impl UserDirectory for MongoUserDirectory {
    async fn find_by_susu_account(
        &self,
        account_id: &str,
    ) -> Result<Option<UserAccount>, AppError> {
        // find_one caps the result at a single document
        self.users
            .find_one(doc! { "susuAccountId": account_id }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up user by susu account: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }
}

/// Directory backed by a vector, for tests and local runs without MongoDB.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<Vec<UserAccount>>,
    lookups: AtomicU64,
    unavailable: AtomicBool,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<UserAccount>) -> Self {
        Self {
            users: RwLock::new(users),
            ..Self::default()
        }
    }

    /// Number of lookups served so far.
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Simulate a store outage: lookups and health checks fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "user directory unavailable"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_susu_account(
        &self,
        account_id: &str,
    ) -> Result<Option<UserAccount>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let users = self
            .users
            .read()
            .map_err(|_| AppError::InternalError(anyhow::anyhow!("user directory lock poisoned")))?;

        Ok(users
            .iter()
            .find(|u| u.susu_account_id.as_deref() == Some(account_id))
            .cloned())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.check_available()
    }
}
