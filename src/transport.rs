//! The contract between [`HttpClient`](crate::HttpClient) and whatever performs
//! network I/O for one attempt.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::Method;
use thiserror::Error;

/// Numeric transport failure codes, libcurl-compatible.
pub mod codes {
    pub const URL_MALFORMAT: u32 = 3;
    pub const COULDNT_RESOLVE_PROXY: u32 = 5;
    pub const COULDNT_RESOLVE_HOST: u32 = 6;
    pub const COULDNT_CONNECT: u32 = 7;
    pub const OPERATION_TIMEDOUT: u32 = 28;
    pub const SSL_CONNECT_ERROR: u32 = 35;
    pub const TOO_MANY_REDIRECTS: u32 = 47;
    pub const RECV_ERROR: u32 = 56;
    pub const SSL_CERTPROBLEM: u32 = 58;
    pub const SSL_CIPHER: u32 = 59;
    pub const SSL_CACERT: u32 = 60;
    pub const UNKNOWN: u32 = 999;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransportOptions {
    pub timeout: Duration,
    pub follow_redirects: bool,
    pub verify_tls: bool,
}

/// One fully prepared attempt: default headers are already merged in and the
/// body is buffered.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub options: TransportOptions,
}

/// Header block and body in one buffer; the first `header_size` bytes are
/// the header block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub header_size: usize,
    pub raw: Bytes,
}

impl RawResponse {
    /// Builds a payload from a header block and a body.
    pub fn from_parts(status: u16, head: &str, body: &[u8]) -> Self {
        let mut raw = Vec::with_capacity(head.len() + body.len());
        raw.extend_from_slice(head.as_bytes());
        raw.extend_from_slice(body);
        Self {
            status,
            header_size: head.len(),
            raw: Bytes::from(raw),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    Timeout,
    Network,
    Tls,
    Other,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("transport error {code}: {message}")]
pub struct TransportError {
    pub code: u32,
    pub message: String,
}

impl TransportError {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        match self.code {
            codes::OPERATION_TIMEDOUT => TransportErrorKind::Timeout,
            codes::COULDNT_RESOLVE_PROXY | codes::COULDNT_RESOLVE_HOST | codes::COULDNT_CONNECT => {
                TransportErrorKind::Network
            }
            codes::SSL_CONNECT_ERROR
            | codes::SSL_CERTPROBLEM
            | codes::SSL_CIPHER
            | codes::SSL_CACERT => TransportErrorKind::Tls,
            _ => TransportErrorKind::Other,
        }
    }
}

/// Performs one attempt. Implementations must not retry on their own.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &TransportRequest) -> Result<RawResponse, TransportError>;
}

impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    fn execute(&self, request: &TransportRequest) -> Result<RawResponse, TransportError> {
        (**self).execute(request)
    }
}
