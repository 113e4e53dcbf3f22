use std::sync::Arc;

use crate::config::ClientConfig;
use crate::extensions::Clock;
use crate::rate_limit::RateLimiter;
use crate::retry::RetryStrategy;
use crate::transport::Transport;

mod builder;
mod execute;
mod request;
#[cfg(feature = "ureq-transport")]
mod transport;

pub use request::RequestOptions;
#[cfg(feature = "ureq-transport")]
pub use transport::UreqTransport;

const DEFAULT_CLIENT_NAME: &str = "reqkit";

pub struct HttpClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    retry_strategy: Option<Arc<dyn RetryStrategy>>,
    clock: Arc<dyn Clock>,
    client_name: String,
}

/// Blocking HTTP client: rate limiting, transport execution, error
/// classification and retry around one [`Transport`].
///
/// Cheap to share across threads behind an `Arc`; every call to
/// [`send`](HttpClient::send) runs on the caller's thread, backoff sleeps
/// included.
pub struct HttpClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    retry_strategy: Arc<dyn RetryStrategy>,
    rate_limiter: RateLimiter,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpClient")
            .field("config", &self.config)
            .field("rate_limiter", &self.rate_limiter)
            .field("max_attempts", &self.retry_strategy.attempt_limit())
            .finish_non_exhaustive()
    }
}
