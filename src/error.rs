use std::time::Duration;

use thiserror::Error;

use crate::request::Request;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    InvalidArgument,
    StreamDetached,
    RateLimitExceeded,
    Timeout,
    Network,
    Ssl,
    RequestFailed,
    HttpStatus,
    SerializeJson,
    SerializeQuery,
    Deserialize,
    InvalidConfig,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::StreamDetached => "stream_detached",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Ssl => "ssl",
            Self::RequestFailed => "request_failed",
            Self::HttpStatus => "http_status",
            Self::SerializeJson => "serialize_json",
            Self::SerializeQuery => "serialize_query",
            Self::Deserialize => "deserialize",
            Self::InvalidConfig => "invalid_config",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
    #[error("stream is detached")]
    StreamDetached,
    #[error("rate limit of {limit} requests per {}s exceeded", .window.as_secs())]
    RateLimitExceeded { limit: usize, window: Duration },
    #[error(
        "request timed out after {:.1} seconds for {}",
        .timeout.as_secs_f64(),
        .request.describe()
    )]
    Timeout {
        timeout: Duration,
        request: Box<Request>,
    },
    #[error("connection failed for {}: {detail}", .request.describe())]
    Network {
        detail: String,
        request: Box<Request>,
    },
    #[error("ssl error for {}: {detail}", .request.describe())]
    Ssl {
        detail: String,
        request: Box<Request>,
    },
    #[error("request failed for {}: {detail}", .request.describe())]
    RequestFailed {
        detail: String,
        request: Box<Request>,
    },
    #[error(
        "http request returned status code {status}: {reason_phrase} for {}",
        .request.describe()
    )]
    HttpStatus {
        status: u16,
        reason_phrase: String,
        request: Box<Request>,
    },
    #[error("failed to serialize request json: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize request query: {source}")]
    SerializeQuery {
        #[source]
        source: serde_urlencoded::ser::Error,
    },
    #[error("failed to decode response json: {source}; body={body}")]
    Deserialize {
        #[source]
        source: serde_json::Error,
        body: String,
    },
    #[error("invalid client configuration: {source}")]
    InvalidConfig {
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::StreamDetached => ErrorCode::StreamDetached,
            Self::RateLimitExceeded { .. } => ErrorCode::RateLimitExceeded,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Network { .. } => ErrorCode::Network,
            Self::Ssl { .. } => ErrorCode::Ssl,
            Self::RequestFailed { .. } => ErrorCode::RequestFailed,
            Self::HttpStatus { .. } => ErrorCode::HttpStatus,
            Self::Serialize { .. } => ErrorCode::SerializeJson,
            Self::SerializeQuery { .. } => ErrorCode::SerializeQuery,
            Self::Deserialize { .. } => ErrorCode::Deserialize,
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
        }
    }

    /// Whether the send pipeline may consult the retry strategy for this failure.
    ///
    /// Transport-level failures always qualify. Status errors qualify only for
    /// `5xx`, `408` and `429`; everything else is terminal.
    pub fn is_retry_eligible(&self) -> bool {
        match self {
            Self::Timeout { .. }
            | Self::Network { .. }
            | Self::Ssl { .. }
            | Self::RequestFailed { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500 || matches!(status, 408 | 429),
            _ => false,
        }
    }

    /// Timeouts and TLS failures are network failures too.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Network { .. } | Self::Ssl { .. }
        )
    }

    pub fn request(&self) -> Option<&Request> {
        match self {
            Self::Timeout { request, .. }
            | Self::Network { request, .. }
            | Self::Ssl { request, .. }
            | Self::RequestFailed { request, .. }
            | Self::HttpStatus { request, .. } => Some(request),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Error, ErrorCode};
    use crate::request::Request;

    fn request() -> Box<Request> {
        Box::new(
            Request::try_new("get", "https://api.example.com/v1/items?token=secret")
                .expect("request"),
        )
    }

    fn status_error(status: u16) -> Error {
        Error::HttpStatus {
            status,
            reason_phrase: String::new(),
            request: request(),
        }
    }

    #[test]
    fn status_errors_are_retry_eligible_only_for_transient_codes() {
        for status in [500_u16, 502, 503, 504, 599, 408, 429] {
            assert!(status_error(status).is_retry_eligible(), "{status}");
        }
        for status in [400_u16, 401, 403, 404, 409, 422] {
            assert!(!status_error(status).is_retry_eligible(), "{status}");
        }
    }

    #[test]
    fn transport_failures_are_retry_eligible() {
        let errors = [
            Error::Timeout {
                timeout: Duration::from_secs(30),
                request: request(),
            },
            Error::Network {
                detail: "refused".to_owned(),
                request: request(),
            },
            Error::Ssl {
                detail: "bad certificate".to_owned(),
                request: request(),
            },
            Error::RequestFailed {
                detail: "boom".to_owned(),
                request: request(),
            },
        ];
        for error in &errors {
            assert!(error.is_retry_eligible(), "{error}");
            assert!(error.request().is_some());
        }
    }

    #[test]
    fn rate_limit_rejection_is_terminal_and_reports_window_in_seconds() {
        let error = Error::RateLimitExceeded {
            limit: 3,
            window: Duration::from_secs(60),
        };
        assert!(!error.is_retry_eligible());
        assert_eq!(error.code(), ErrorCode::RateLimitExceeded);
        assert_eq!(
            error.to_string(),
            "rate limit of 3 requests per 60s exceeded"
        );
    }

    #[test]
    fn ssl_and_timeout_are_network_failures() {
        let ssl = Error::Ssl {
            detail: "handshake".to_owned(),
            request: request(),
        };
        let failed = Error::RequestFailed {
            detail: "boom".to_owned(),
            request: request(),
        };
        assert!(ssl.is_network());
        assert!(!failed.is_network());
        assert_eq!(ssl.code().as_str(), "ssl");
    }

    #[test]
    fn display_redacts_query_of_carried_request() {
        let error = Error::Timeout {
            timeout: Duration::from_secs(30),
            request: request(),
        };
        let text = error.to_string();
        assert_eq!(
            text,
            "request timed out after 30.0 seconds for GET https://api.example.com/v1/items"
        );
    }
}
