//! Withdrawal notifier - push notifications for susu withdrawal requests.

pub mod config;
pub mod handlers;
pub mod models;
pub mod notifier;
pub mod services;
pub mod startup;
