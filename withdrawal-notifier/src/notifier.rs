//! Maps withdrawal change events to push notifications.
//!
//! Both entry points run to completion and never return an error: missing
//! data ends the invocation quietly, and lookup or delivery failures are
//! logged and dropped. Nothing is retried.

use crate::models::{NotificationPayload, WithdrawalRequest};
use crate::services::{record_push_send, PushProvider, UserDirectory};
use std::fmt;
use std::sync::Arc;

/// Why an invocation ended without sending anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The event carried no document snapshot.
    MissingSnapshot,
    StatusUnchanged,
    /// The status field was removed from the document.
    StatusCleared,
    MissingAccountId,
    UserNotFound,
    MissingDeviceToken,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingSnapshot => "missing_snapshot",
            SkipReason::StatusUnchanged => "status_unchanged",
            SkipReason::StatusCleared => "status_cleared",
            SkipReason::MissingAccountId => "missing_account_id",
            SkipReason::UserNotFound => "user_not_found",
            SkipReason::MissingDeviceToken => "missing_device_token",
        }
    }
}

/// What a single trigger invocation ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    SendFailed,
    LookupFailed,
    Skipped(SkipReason),
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Sent => "sent",
            Outcome::SendFailed => "send_failed",
            Outcome::LookupFailed => "lookup_failed",
            Outcome::Skipped(reason) => reason.as_str(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle injected into both trigger handlers.
#[derive(Clone)]
pub struct Notifier {
    directory: Arc<dyn UserDirectory>,
    push: Arc<dyn PushProvider>,
    admin_topic: String,
}

impl Notifier {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        push: Arc<dyn PushProvider>,
        admin_topic: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            push,
            admin_topic: admin_topic.into(),
        }
    }

    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }

    pub fn admin_topic(&self) -> &str {
        &self.admin_topic
    }

    /// Alert administrators that a withdrawal request was created.
    #[tracing::instrument(skip(self, snapshot), fields(topic = %self.admin_topic))]
    pub async fn notify_withdrawal_created(
        &self,
        request_id: &str,
        snapshot: Option<WithdrawalRequest>,
    ) -> Outcome {
        let Some(withdrawal) = snapshot else {
            tracing::debug!("Created event without snapshot, nothing to send");
            return Outcome::Skipped(SkipReason::MissingSnapshot);
        };

        let payload = NotificationPayload::new_withdrawal_alert(&self.admin_topic, &withdrawal);

        match self.deliver(&payload).await {
            Ok(()) => {
                tracing::info!("Successfully sent admin notification");
                Outcome::Sent
            }
            Err(e) => {
                tracing::error!(error = %e, "Error sending admin notification");
                Outcome::SendFailed
            }
        }
    }

    /// Tell the owning user that their withdrawal request changed status.
    #[tracing::instrument(skip(self, before, after))]
    pub async fn notify_withdrawal_updated(
        &self,
        request_id: &str,
        before: Option<WithdrawalRequest>,
        after: Option<WithdrawalRequest>,
    ) -> Outcome {
        let (Some(before), Some(after)) = (before, after) else {
            tracing::debug!("Updated event without both snapshots, nothing to send");
            return Outcome::Skipped(SkipReason::MissingSnapshot);
        };

        if before.status == after.status {
            return Outcome::Skipped(SkipReason::StatusUnchanged);
        }

        let Some(status) = after.parsed_status() else {
            tracing::debug!(old_status = ?before.status, "Status removed from withdrawal");
            return Outcome::Skipped(SkipReason::StatusCleared);
        };

        let Some(account_id) = after.susu_account_id.as_deref() else {
            tracing::warn!(status = %status, "Withdrawal has no susuAccountId");
            return Outcome::Skipped(SkipReason::MissingAccountId);
        };

        let user = match self.directory.find_by_susu_account(account_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::debug!(account_id = %account_id, "No user linked to susu account");
                return Outcome::Skipped(SkipReason::UserNotFound);
            }
            Err(e) => {
                tracing::error!(account_id = %account_id, error = %e, "Error looking up user");
                return Outcome::LookupFailed;
            }
        };

        let user_id = user.display_id();

        let Some(token) = user.device_token() else {
            tracing::debug!(user_id = %user_id, "User has no device token");
            return Outcome::Skipped(SkipReason::MissingDeviceToken);
        };

        let payload = NotificationPayload::status_update(token, &status, &after);

        match self.deliver(&payload).await {
            Ok(()) => {
                tracing::info!(
                    user_id = %user_id,
                    status = %status,
                    "Successfully sent notification to user {}",
                    user_id
                );
                Outcome::Sent
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Error sending notification");
                Outcome::SendFailed
            }
        }
    }

    async fn deliver(
        &self,
        payload: &NotificationPayload,
    ) -> Result<(), crate::services::ProviderError> {
        let result = self.push.send(payload).await;
        let status = if result.is_ok() { "success" } else { "failure" };
        record_push_send(payload.target.kind(), status);
        result.map(|_| ())
    }
}
