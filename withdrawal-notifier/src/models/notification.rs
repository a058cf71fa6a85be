use super::withdrawal::{WithdrawalRequest, WithdrawalStatus};
use std::fmt;

pub const CURRENCY_SYMBOL: &str = "GH¢";

/// Where a push notification is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushTarget {
    /// Broadcast to every device subscribed to the named topic.
    Topic(String),
    /// Unicast to a single device registration token.
    Token(String),
}

impl PushTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            PushTarget::Topic(_) => "topic",
            PushTarget::Token(_) => "token",
        }
    }
}

impl fmt::Display for PushTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushTarget::Topic(name) => write!(f, "topic:{}", name),
            PushTarget::Token(token) => write!(f, "token:{}", token),
        }
    }
}

/// A notification built for one trigger invocation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub target: PushTarget,
}

impl NotificationPayload {
    /// Administrator alert for a newly created withdrawal request.
    pub fn new_withdrawal_alert(topic: &str, withdrawal: &WithdrawalRequest) -> Self {
        Self {
            title: "New Withdrawal Request".to_string(),
            body: format!(
                "Account {} has requested {}{}.",
                withdrawal.account_label(),
                CURRENCY_SYMBOL,
                withdrawal.amount_label()
            ),
            target: PushTarget::Topic(topic.to_string()),
        }
    }

    /// User-facing message for a status transition.
    pub fn status_update(
        device_token: &str,
        status: &WithdrawalStatus,
        withdrawal: &WithdrawalRequest,
    ) -> Self {
        let amount = withdrawal.amount_label();
        let (title, body) = match status {
            WithdrawalStatus::Processing => (
                "Request Processing".to_string(),
                format!(
                    "Your withdrawal request for {}{} is now being processed by an admin.",
                    CURRENCY_SYMBOL, amount
                ),
            ),
            WithdrawalStatus::Approved => (
                "Request Approved! ✅".to_string(),
                format!(
                    "Great news! Your withdrawal of {}{} has been approved.",
                    CURRENCY_SYMBOL, amount
                ),
            ),
            WithdrawalStatus::Rejected => (
                "Request Declined ❌".to_string(),
                format!(
                    "Your withdrawal request for {}{} was declined. \
                     Please check the app for details.",
                    CURRENCY_SYMBOL, amount
                ),
            ),
            WithdrawalStatus::Other(raw) => (
                "Withdrawal Update".to_string(),
                format!(
                    "Your request status has changed to: {}",
                    raw.to_uppercase()
                ),
            ),
        };

        Self {
            title,
            body,
            target: PushTarget::Token(device_token.to_string()),
        }
    }
}
