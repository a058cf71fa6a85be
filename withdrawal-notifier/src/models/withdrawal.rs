use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Snapshot of a `withdrawals/{requestId}` document.
///
/// Every field is optional: the document is written by other services and this
/// one only reads whatever the snapshot carries. `susuAccountId` and `status`
/// accept any scalar; numbers and booleans are kept in their text form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar_as_string"
    )]
    pub susu_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar_as_string"
    )]
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let scalar: Option<Scalar> = Option::deserialize(deserializer)?;
    Ok(scalar.map(|s| match s {
        Scalar::Text(text) => text,
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

impl WithdrawalRequest {
    /// Account id as it appears in message bodies.
    pub fn account_label(&self) -> &str {
        self.susu_account_id.as_deref().unwrap_or(UNKNOWN)
    }

    /// Amount as it appears in message bodies, without the currency symbol.
    pub fn amount_label(&self) -> String {
        self.amount
            .as_ref()
            .map(|a| a.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    pub fn parsed_status(&self) -> Option<WithdrawalStatus> {
        self.status.as_deref().map(WithdrawalStatus::from)
    }
}

const UNKNOWN: &str = "unknown";

/// Withdrawal amount in cedis.
///
/// Stored numerically, but older records carry it as a string; both render
/// verbatim. Numbers print in their shortest form (`50`, `50.5`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{}", n),
            Amount::Text(s) => f.write_str(s),
        }
    }
}

/// Lifecycle status of a withdrawal request.
///
/// Only three values carry a dedicated user message; anything else is kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalStatus {
    Processing,
    Approved,
    Rejected,
    Other(String),
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &str {
        match self {
            WithdrawalStatus::Processing => "processing",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Rejected => "rejected",
            WithdrawalStatus::Other(s) => s,
        }
    }
}

impl From<&str> for WithdrawalStatus {
    fn from(value: &str) -> Self {
        match value {
            "processing" => WithdrawalStatus::Processing,
            "approved" => WithdrawalStatus::Approved,
            "rejected" => WithdrawalStatus::Rejected,
            other => WithdrawalStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
