use std::io::Read;

use crate::transport::{RawResponse, Transport, TransportError, TransportRequest, codes};

const MAX_REDIRECTS: u32 = 10;

/// [`Transport`] backed by a blocking `ureq` agent.
///
/// Non-2xx responses are returned as data; status classification happens in
/// [`HttpClient`](crate::HttpClient).
#[derive(Clone, Debug)]
pub struct UreqTransport {
    verified: ureq::Agent,
    unverified: ureq::Agent,
}

impl UreqTransport {
    pub fn new(client_name: &str) -> Self {
        Self {
            verified: make_agent(client_name, true),
            unverified: make_agent(client_name, false),
        }
    }

    fn agent(&self, verify_tls: bool) -> &ureq::Agent {
        if verify_tls {
            &self.verified
        } else {
            &self.unverified
        }
    }

    fn run<S: ureq::AsSendBody>(
        &self,
        request: ureq::http::Request<S>,
        transport_request: &TransportRequest,
    ) -> Result<RawResponse, TransportError> {
        let options = transport_request.options;
        let agent = self.agent(options.verify_tls);
        let configured_request = agent
            .configure_request(request)
            .timeout_global(Some(options.timeout))
            .max_redirects(if options.follow_redirects {
                MAX_REDIRECTS
            } else {
                0
            })
            .build();

        let mut response = agent
            .run(configured_request)
            .map_err(|error| transport_error(&error))?;

        let mut body = Vec::new();
        response
            .body_mut()
            .as_reader()
            .read_to_end(&mut body)
            .map_err(|source| match wrapped_ureq_error(&source) {
                Some(error) => transport_error(error),
                None => io_transport_error(&source),
            })?;

        let head = response_head(&response);
        Ok(RawResponse::from_parts(
            response.status().as_u16(),
            &head,
            &body,
        ))
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(super::DEFAULT_CLIENT_NAME)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &TransportRequest) -> Result<RawResponse, TransportError> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.clone())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.body.is_empty() {
            let http_request = builder.body(()).map_err(request_build_error)?;
            return self.run(http_request, request);
        }
        let http_request = builder
            .body(request.body.to_vec())
            .map_err(request_build_error)?;
        self.run(http_request, request)
    }
}

fn make_agent(client_name: &str, verify_tls: bool) -> ureq::Agent {
    let tls_config = ureq::tls::TlsConfig::builder()
        .disable_verification(!verify_tls)
        .build();
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .user_agent(client_name)
        .tls_config(tls_config)
        .build()
        .new_agent()
}

// Rebuilt as text so the client parses every transport the same way.
fn response_head(response: &ureq::http::Response<ureq::Body>) -> String {
    let status = response.status();
    let version = match response.version() {
        ureq::http::Version::HTTP_09 => "0.9",
        ureq::http::Version::HTTP_10 => "1.0",
        ureq::http::Version::HTTP_2 => "2",
        ureq::http::Version::HTTP_3 => "3",
        _ => "1.1",
    };
    let mut head = format!(
        "HTTP/{version} {} {}\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    );
    for (name, value) in response.headers() {
        let value = String::from_utf8_lossy(value.as_bytes());
        head.push_str(&format!("{}: {value}\r\n", name.as_str()));
    }
    head.push_str("\r\n");
    head
}

fn request_build_error(source: ureq::http::Error) -> TransportError {
    TransportError::new(codes::URL_MALFORMAT, source.to_string())
}

fn transport_error(error: &ureq::Error) -> TransportError {
    let code = match error {
        ureq::Error::Timeout(_) => codes::OPERATION_TIMEDOUT,
        ureq::Error::HostNotFound => codes::COULDNT_RESOLVE_HOST,
        ureq::Error::ConnectionFailed => codes::COULDNT_CONNECT,
        ureq::Error::ConnectProxyFailed(_) => codes::COULDNT_RESOLVE_PROXY,
        ureq::Error::TooManyRedirects => codes::TOO_MANY_REDIRECTS,
        ureq::Error::BadUri(_) => codes::URL_MALFORMAT,
        ureq::Error::Tls(_) | ureq::Error::Rustls(_) => tls_code(&error.to_string()),
        ureq::Error::Io(source) => return io_transport_error(source),
        _ => codes::UNKNOWN,
    };
    TransportError::new(code, error.to_string())
}

fn tls_code(message: &str) -> u32 {
    if message.to_ascii_lowercase().contains("certificate") {
        codes::SSL_CACERT
    } else {
        codes::SSL_CONNECT_ERROR
    }
}

fn io_transport_error(source: &std::io::Error) -> TransportError {
    let code = match source.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => codes::OPERATION_TIMEDOUT,
        std::io::ErrorKind::NotFound => codes::COULDNT_RESOLVE_HOST,
        std::io::ErrorKind::ConnectionRefused
        | std::io::ErrorKind::ConnectionAborted
        | std::io::ErrorKind::NotConnected
        | std::io::ErrorKind::AddrNotAvailable => codes::COULDNT_CONNECT,
        std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::UnexpectedEof => codes::RECV_ERROR,
        _ => codes::UNKNOWN,
    };
    TransportError::new(code, source.to_string())
}

fn wrapped_ureq_error(io_error: &std::io::Error) -> Option<&ureq::Error> {
    io_error
        .get_ref()
        .and_then(|source| source.downcast_ref::<ureq::Error>())
}

#[cfg(test)]
mod tests {
    use super::{io_transport_error, transport_error};
    use crate::transport::{TransportErrorKind, codes};

    #[test]
    fn ureq_errors_map_onto_transport_codes() {
        assert_eq!(
            transport_error(&ureq::Error::HostNotFound).code,
            codes::COULDNT_RESOLVE_HOST
        );
        assert_eq!(
            transport_error(&ureq::Error::ConnectionFailed).kind(),
            TransportErrorKind::Network
        );
        assert_eq!(
            transport_error(&ureq::Error::Tls("invalid peer certificate")).code,
            codes::SSL_CACERT
        );
        assert_eq!(
            transport_error(&ureq::Error::Tls("handshake failure")).kind(),
            TransportErrorKind::Tls
        );
        assert_eq!(
            transport_error(&ureq::Error::TooManyRedirects).kind(),
            TransportErrorKind::Other
        );
    }

    #[test]
    fn io_errors_map_by_kind() {
        let refused = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        assert_eq!(io_transport_error(&refused).code, codes::COULDNT_CONNECT);
        let timed_out = std::io::Error::from(std::io::ErrorKind::TimedOut);
        assert_eq!(
            io_transport_error(&timed_out).kind(),
            TransportErrorKind::Timeout
        );
        let reset = std::io::Error::from(std::io::ErrorKind::ConnectionReset);
        assert_eq!(io_transport_error(&reset).code, codes::RECV_ERROR);
    }
}
