use crate::headers::{Headers, IntoHeaderValues};
use crate::stream::Stream;

/// Operations shared by [`Request`](crate::Request) and
/// [`Response`](crate::Response).
///
/// Every `with_*` method returns a new message and leaves `self` untouched.
pub trait Message: Sized {
    fn headers(&self) -> &Headers;

    fn protocol_version(&self) -> &str;

    fn body(&self) -> &Stream;

    /// Replaces the whole header bag.
    fn with_headers(&self, headers: Headers) -> Self;

    fn with_protocol_version(&self, version: &str) -> Self;

    /// Moves `body` into the new message.
    fn with_body(&self, body: Stream) -> Self;

    fn has_header(&self, name: &str) -> bool {
        self.headers().contains(name)
    }

    fn header(&self, name: &str) -> &[String] {
        self.headers().get(name)
    }

    fn header_line(&self, name: &str) -> String {
        self.headers().get_line(name)
    }

    fn with_header(&self, name: &str, values: impl IntoHeaderValues) -> Self {
        let mut headers = self.headers().clone();
        headers.set(name, values);
        self.with_headers(headers)
    }

    fn with_added_header(&self, name: &str, values: impl IntoHeaderValues) -> Self {
        let mut headers = self.headers().clone();
        headers.append(name, values);
        self.with_headers(headers)
    }

    fn without_header(&self, name: &str) -> Self {
        let mut headers = self.headers().clone();
        headers.remove(name);
        self.with_headers(headers)
    }
}
