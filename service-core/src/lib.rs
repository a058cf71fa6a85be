//! service-core: shared infrastructure for the withdrawal notifier services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
