use std::sync::Arc;
use std::time::Duration;

use http::Method;
use tracing::{debug, info_span, warn};

use crate::Result;
use crate::config::{ClientConfig, MIN_TIMEOUT};
use crate::error::Error;
use crate::extensions::SystemClock;
use crate::message::Message;
use crate::rate_limit::RateLimiter;
use crate::request::Request;
use crate::response::Response;
use crate::stream::Stream;
use crate::transport::{
    Transport, TransportError, TransportErrorKind, TransportOptions, TransportRequest,
};
use crate::util::{append_query, parse_raw_response};

use super::{HttpClient, HttpClientBuilder, RequestOptions};

impl HttpClient {
    /// A client driven by `config` over `transport`, using the wall clock.
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let clock = Arc::new(SystemClock);
        Self {
            rate_limiter: RateLimiter::with_clock(config.rate_limit_policy(), clock.clone()),
            retry_strategy: Arc::new(config.retry_strategy()),
            config,
            transport,
            clock,
        }
    }

    /// Default options over the `ureq` transport.
    #[cfg(feature = "ureq-transport")]
    pub fn standard() -> Self {
        Self::new(
            ClientConfig::default(),
            Arc::new(super::UreqTransport::new(super::DEFAULT_CLIENT_NAME)),
        )
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends `request`, retrying transient failures.
    ///
    /// The rate limiter is consulted once per call, after the request body is
    /// buffered and before the first attempt.
    /// Transport failures and `5xx`/`408`/`429` statuses are retried while the
    /// retry strategy agrees, sleeping on the calling thread in between.
    pub fn send(&self, request: Request) -> Result<Response> {
        let transport_request = self.prepare(&request)?;
        self.rate_limiter.admit()?;

        let redacted_uri = request.uri().redacted();
        let max_attempts = self.retry_strategy.attempt_limit();
        let mut attempt = 1_usize;
        loop {
            let span = info_span!(
                "reqkit.request",
                method = %request.method(),
                uri = %redacted_uri,
                attempt = attempt,
                max_attempts = max_attempts
            );
            let _enter = span.enter();

            debug!("sending request");
            let error = match self.execute_once(&transport_request, &request) {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };
            if !error.is_retry_eligible() || !self.retry_strategy.should_retry(attempt, &error) {
                return Err(error);
            }

            let delay = self.retry_strategy.next_delay(attempt);
            warn!(
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "retrying request"
            );
            if !delay.is_zero() {
                self.clock.sleep(delay);
            }
            attempt += 1;
        }
    }

    /// Builds a request from `url` and `options` and [`send`](Self::send)s it.
    pub fn request(&self, method: &str, url: &str, options: RequestOptions) -> Result<Response> {
        let url = append_query(
            url,
            options
                .query
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );
        let mut request = Request::try_new(method, &url)?;
        if !options.headers.is_empty() {
            let headers = request.headers().merged_with(&options.headers);
            request = request.with_headers(headers);
        }
        if let Some(body) = options.body {
            request = request.with_body(Stream::from(body));
        }
        self.send(request)
    }

    pub fn get(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::GET.as_str(), url, options)
    }

    pub fn post(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::POST.as_str(), url, options)
    }

    pub fn put(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::PUT.as_str(), url, options)
    }

    pub fn delete(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::DELETE.as_str(), url, options)
    }

    pub fn patch(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::PATCH.as_str(), url, options)
    }

    fn prepare(&self, request: &Request) -> Result<TransportRequest> {
        let headers = self.config.headers.merged_with(request.headers());
        Ok(TransportRequest {
            method: request.method().clone(),
            url: request.uri().to_string(),
            headers: headers.to_lines(),
            body: request.body().to_bytes()?,
            options: TransportOptions {
                timeout: self.config.timeout.max(MIN_TIMEOUT),
                follow_redirects: self.config.allow_redirects,
                verify_tls: self.config.verify_tls,
            },
        })
    }

    fn execute_once(
        &self,
        transport_request: &TransportRequest,
        request: &Request,
    ) -> Result<Response> {
        let started = self.clock.now();
        let raw = self
            .transport
            .execute(transport_request)
            .map_err(|error| self.classify_transport_error(error, request))?;
        let response = parse_raw_response(&raw).ok_or_else(|| Error::RequestFailed {
            detail: format!(
                "header size {} exceeds response length {}",
                raw.header_size,
                raw.raw.len()
            ),
            request: Box::new(request.clone()),
        })?;

        debug!(
            status = response.status(),
            elapsed_ms = elapsed_millis(self.clock.now().saturating_duration_since(started)),
            "request completed"
        );

        if self.config.http_errors && response.status() >= 400 {
            return Err(Error::HttpStatus {
                status: response.status(),
                reason_phrase: response.reason_phrase().to_owned(),
                request: Box::new(request.clone()),
            });
        }
        Ok(response)
    }

    fn classify_transport_error(&self, error: TransportError, request: &Request) -> Error {
        let request = Box::new(request.clone());
        match error.kind() {
            TransportErrorKind::Timeout => Error::Timeout {
                timeout: self.config.timeout,
                request,
            },
            TransportErrorKind::Network => Error::Network {
                detail: error.message,
                request,
            },
            TransportErrorKind::Tls => Error::Ssl {
                detail: error.message,
                request,
            },
            TransportErrorKind::Other => Error::RequestFailed {
                detail: error.to_string(),
                request,
            },
        }
    }
}

fn elapsed_millis(elapsed: Duration) -> u64 {
    elapsed.as_millis().min(u128::from(u64::MAX)) as u64
}
