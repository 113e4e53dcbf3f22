//! `reqkit` is a blocking HTTP client built around immutable request and
//! response values, with fixed-window rate limiting and exponential retry.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use reqkit::prelude::{ExponentialBackoff, HttpClient, Message, RequestOptions};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Item {
//!     id: u64,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::builder()
//!         .timeout(Duration::from_secs(5))
//!         .default_header("Accept", "application/json")
//!         .rate_limit(100, Duration::from_secs(60))
//!         .retry_strategy(ExponentialBackoff::new(3, Duration::from_millis(200)))
//!         .build()?;
//!
//!     let response = client.post(
//!         "https://api.example.com/v1/items",
//!         RequestOptions::new().json(&serde_json::json!({ "name": "demo" }))?,
//!     )?;
//!     let item: Item = response.json()?;
//!     println!("created id={} via HTTP/{}", item.id, response.protocol_version());
//!     Ok(())
//! }
//! ```
//!
//! # Failure model
//!
//! Every failure is an [`Error`]. Timeouts, connection and TLS failures, and
//! `5xx`/`408`/`429` statuses are retried by the client's [`RetryStrategy`];
//! everything else, including a rate-limit rejection, is returned at once.

mod client;
mod config;
mod error;
mod extensions;
mod headers;
mod message;
mod rate_limit;
mod request;
mod response;
mod retry;
mod stream;
pub mod transport;
mod uri;
mod util;

#[cfg(feature = "ureq-transport")]
pub use crate::client::UreqTransport;
pub use crate::client::{HttpClient, HttpClientBuilder, RequestOptions};
pub use crate::config::ClientConfig;
pub use crate::error::{Error, ErrorCode};
pub use crate::extensions::{Clock, SystemClock};
pub use crate::headers::{Headers, IntoHeaderValues};
pub use crate::message::Message;
pub use crate::rate_limit::{RateLimitPolicy, RateLimiter};
pub use crate::request::Request;
pub use crate::response::Response;
pub use crate::retry::{ExponentialBackoff, RetryStrategy};
pub use crate::stream::Stream;
pub use crate::uri::Uri;
pub use crate::util::append_query;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub mod prelude {
    pub use crate::{
        ClientConfig, Error, ErrorCode, ExponentialBackoff, Headers, HttpClient, Message,
        RateLimitPolicy, Request, RequestOptions, Response, Result, RetryStrategy, Stream, Uri,
    };
}
