use std::sync::Arc;
use std::time::Duration;

use crate::config::{ClientConfig, MIN_TIMEOUT};
use crate::extensions::{Clock, SystemClock};
use crate::headers::IntoHeaderValues;
use crate::rate_limit::RateLimiter;
use crate::retry::RetryStrategy;
use crate::transport::Transport;

use super::{DEFAULT_CLIENT_NAME, HttpClient, HttpClientBuilder};

impl HttpClientBuilder {
    pub(crate) fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            transport: None,
            retry_strategy: None,
            clock: Arc::new(SystemClock),
            client_name: DEFAULT_CLIENT_NAME.to_owned(),
        }
    }

    /// Replaces every option set so far with `config`.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout.max(MIN_TIMEOUT);
        self
    }

    pub fn allow_redirects(mut self, allow_redirects: bool) -> Self {
        self.config.allow_redirects = allow_redirects;
        self
    }

    pub fn http_errors(mut self, http_errors: bool) -> Self {
        self.config.http_errors = http_errors;
        self
    }

    pub fn verify_tls(mut self, verify_tls: bool) -> Self {
        self.config.verify_tls = verify_tls;
        self
    }

    pub fn default_header(mut self, name: &str, values: impl IntoHeaderValues) -> Self {
        self.config.headers.set(name, values);
        self
    }

    pub fn rate_limit(mut self, limit: usize, window: Duration) -> Self {
        self.config.rate_limit = limit;
        self.config.rate_limit_window = window;
        self
    }

    /// Overrides the backoff derived from the retry fields of the config.
    pub fn retry_strategy_arc(mut self, retry_strategy: Arc<dyn RetryStrategy>) -> Self {
        self.retry_strategy = Some(retry_strategy);
        self
    }

    pub fn retry_strategy<S>(self, retry_strategy: S) -> Self
    where
        S: RetryStrategy + 'static,
    {
        self.retry_strategy_arc(Arc::new(retry_strategy))
    }

    pub fn transport_arc(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn transport<T>(self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport_arc(Arc::new(transport))
    }

    pub fn clock_arc(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock<C>(self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock_arc(Arc::new(clock))
    }

    /// Sent as `User-Agent` by the default transport.
    pub fn client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = client_name.into();
        self
    }

    /// Without an explicit transport the `ureq` transport is used; builds
    /// without the `ureq-transport` feature fail with `InvalidArgument`.
    pub fn build(self) -> crate::Result<HttpClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport(&self.client_name)?,
        };
        let retry_strategy: Arc<dyn RetryStrategy> = match self.retry_strategy {
            Some(retry_strategy) => retry_strategy,
            None => Arc::new(self.config.retry_strategy()),
        };
        let rate_limiter =
            RateLimiter::with_clock(self.config.rate_limit_policy(), Arc::clone(&self.clock));

        Ok(HttpClient {
            config: self.config,
            transport,
            retry_strategy,
            rate_limiter,
            clock: self.clock,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ureq-transport")]
fn default_transport(client_name: &str) -> crate::Result<Arc<dyn Transport>> {
    Ok(Arc::new(super::UreqTransport::new(client_name)))
}

#[cfg(not(feature = "ureq-transport"))]
fn default_transport(_client_name: &str) -> crate::Result<Arc<dyn Transport>> {
    Err(crate::error::Error::invalid_argument(
        "no transport configured and the ureq-transport feature is disabled",
    ))
}
