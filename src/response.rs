use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::Result;
use crate::error::Error;
use crate::headers::Headers;
use crate::message::Message;
use crate::stream::Stream;
use crate::util::truncate_body;

pub(crate) const UNKNOWN_REASON_PHRASE: &str = "Unknown Status Code";

#[derive(Clone, Debug)]
pub struct Response {
    status: u16,
    reason_phrase: String,
    headers: Headers,
    body: Stream,
    protocol_version: String,
}

impl Response {
    /// The reason phrase starts as the canonical one for `status`.
    pub fn new(status: u16, headers: Headers, body: impl Into<Stream>) -> Self {
        Self {
            status,
            reason_phrase: canonical_reason(status).to_owned(),
            headers,
            body: body.into(),
            protocol_version: "1.1".to_owned(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason_phrase(&self) -> &str {
        &self.reason_phrase
    }

    /// An empty `reason` falls back to the canonical phrase for `status`.
    pub fn with_status(&self, status: u16, reason: &str) -> Self {
        let reason_phrase = match reason {
            "" => canonical_reason(status).to_owned(),
            reason => reason.to_owned(),
        };
        Self {
            status,
            reason_phrase,
            ..self.clone()
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text_lossy(&self) -> String {
        match self.body.to_bytes() {
            Ok(body) => String::from_utf8_lossy(&body).into_owned(),
            Err(_) => String::new(),
        }
    }

    pub fn json<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.body.to_bytes()?;
        serde_json::from_slice(&body).map_err(|source| Error::Deserialize {
            source,
            body: truncate_body(&body),
        })
    }
}

impl Message for Response {
    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    fn body(&self) -> &Stream {
        &self.body
    }

    fn with_headers(&self, headers: Headers) -> Self {
        Self {
            headers,
            ..self.clone()
        }
    }

    fn with_protocol_version(&self, version: &str) -> Self {
        Self {
            protocol_version: version.to_owned(),
            ..self.clone()
        }
    }

    fn with_body(&self, body: Stream) -> Self {
        Self {
            status: self.status,
            reason_phrase: self.reason_phrase.clone(),
            headers: self.headers.clone(),
            body,
            protocol_version: self.protocol_version.clone(),
        }
    }
}

pub(crate) fn canonical_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or(UNKNOWN_REASON_PHRASE)
}
