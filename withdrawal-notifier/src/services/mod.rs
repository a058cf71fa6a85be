pub mod directory;
pub mod metrics;
pub mod providers;

pub use directory::{InMemoryUserDirectory, MongoUserDirectory, UserDirectory};
pub use metrics::{get_metrics, init_metrics, record_event, record_push_send};
pub use providers::{
    FcmProvider, MockPushProvider, ProviderError, ProviderResponse, PushProvider,
};
