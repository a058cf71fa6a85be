//! HTTP handlers for withdrawal-notifier: the two trigger endpoints plus
//! infrastructure probes.

pub mod health;
pub mod triggers;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use triggers::{on_withdrawal_created, on_withdrawal_updated};
