use http::Method;

use crate::Result;
use crate::error::Error;
use crate::headers::Headers;
use crate::message::Message;
use crate::stream::Stream;
use crate::uri::Uri;

const HOST_HEADER: &str = "Host";
const DEFAULT_PROTOCOL_VERSION: &str = "1.1";

#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: Headers,
    body: Stream,
    protocol_version: String,
    request_target: Option<String>,
}

impl Request {
    /// Builds a request with an empty body and a `Host` header derived from
    /// `uri` when it names a host.
    pub fn new(method: Method, uri: Uri) -> Self {
        let mut headers = Headers::new();
        if let Some(host) = uri.host_header_value() {
            headers.set(HOST_HEADER, host);
        }
        Self {
            method,
            uri,
            headers,
            body: Stream::new(),
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_owned(),
            request_target: None,
        }
    }

    /// Parses both arguments; the method is upper-cased first.
    pub fn try_new(method: &str, uri: &str) -> Result<Self> {
        Ok(Self::new(parse_method(method)?, Uri::parse(uri)?))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn with_method(&self, method: &str) -> Result<Self> {
        Ok(Self {
            method: parse_method(method)?,
            ..self.clone()
        })
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Swaps the URI.
    ///
    /// `Host` is recomputed from the new URI unless `preserve_host` is set and
    /// a `Host` header already exists.
    pub fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        let mut headers = self.headers.clone();
        if (!preserve_host || !headers.contains(HOST_HEADER))
            && let Some(host) = uri.host_header_value()
        {
            headers.set(HOST_HEADER, host);
        }
        Self {
            method: self.method.clone(),
            uri,
            headers,
            body: self.body.clone(),
            protocol_version: self.protocol_version.clone(),
            request_target: self.request_target.clone(),
        }
    }

    /// The explicit target when one was set, otherwise the URI path or `/`.
    pub fn request_target(&self) -> String {
        match &self.request_target {
            Some(target) => target.clone(),
            None if self.uri.path().is_empty() => "/".to_owned(),
            None => self.uri.path().to_owned(),
        }
    }

    pub fn with_request_target(&self, target: &str) -> Self {
        Self {
            request_target: Some(target.to_owned()),
            ..self.clone()
        }
    }

    /// `METHOD uri` with credentials, query and fragment stripped.
    pub(crate) fn describe(&self) -> String {
        format!("{} {}", self.method, self.uri.redacted())
    }
}

impl Message for Request {
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
            method: self.method.clone(),
            uri: self.uri.clone(),
            headers: self.headers.clone(),
            body,
            protocol_version: self.protocol_version.clone(),
            request_target: self.request_target.clone(),
        }
    }
}

fn parse_method(method: &str) -> Result<Method> {
    let normalized = method.to_ascii_uppercase();
    Method::from_bytes(normalized.as_bytes())
        .map_err(|_| Error::invalid_argument(format!("invalid http method: {method:?}")))
}
