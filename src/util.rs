use std::sync::Mutex;

use crate::headers::Headers;
use crate::message::Message;
use crate::response::{Response, canonical_reason};
use crate::transport::RawResponse;

const MAX_ERROR_BODY_LEN: usize = 2048;
const DEFAULT_PROTOCOL_VERSION: &str = "1.1";

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Appends form-encoded `pairs` to `url`.
///
/// The existing query is kept verbatim and joined with `&`; a URL without a
/// query gets `?`. A fragment stays at the end. No pairs leaves `url` as is.
///
/// ```
/// let url = reqkit::append_query("https://api.example.com", [("q", "a b")]);
/// assert_eq!(url, "https://api.example.com?q=a+b");
///
/// let url = reqkit::append_query("https://api.example.com?page=2", [("q", "a")]);
/// assert_eq!(url, "https://api.example.com?page=2&q=a");
/// ```
pub fn append_query<I, K, V>(url: &str, pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut appended = false;
    for (name, value) in pairs {
        serializer.append_pair(name.as_ref(), value.as_ref());
        appended = true;
    }
    if !appended {
        return url.to_owned();
    }
    let encoded = serializer.finish();

    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };
    let separator = if base.contains('?') { '&' } else { '?' };
    let mut merged = format!("{base}{separator}{encoded}");
    if let Some(fragment) = fragment {
        merged.push('#');
        merged.push_str(fragment);
    }
    merged
}

pub(crate) fn truncate_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.chars().count() <= MAX_ERROR_BODY_LEN {
        return text.into_owned();
    }

    let truncated: String = text.chars().take(MAX_ERROR_BODY_LEN).collect();
    format!("{truncated}...(truncated)")
}

/// Splits a transport result into a [`Response`].
///
/// Returns `None` when `header_size` points past the end of the payload.
pub(crate) fn parse_raw_response(raw: &RawResponse) -> Option<Response> {
    let head = raw.raw.get(..raw.header_size)?;
    let body = raw.raw.slice(raw.header_size..);
    let head = parse_head(&String::from_utf8_lossy(head));

    let reason = head
        .reason_phrase
        .unwrap_or_else(|| canonical_reason(raw.status).to_owned());
    let response = Response::new(raw.status, head.headers, body)
        .with_status(raw.status, &reason)
        .with_protocol_version(&head.protocol_version);
    Some(response)
}

#[derive(Debug)]
struct ResponseHead {
    protocol_version: String,
    reason_phrase: Option<String>,
    headers: Headers,
}

// Every status line starts a new header set, so the last response of a
// redirect chain wins.
fn parse_head(block: &str) -> ResponseHead {
    let mut head = ResponseHead {
        protocol_version: DEFAULT_PROTOCOL_VERSION.to_owned(),
        reason_phrase: None,
        headers: Headers::new(),
    };
    for line in block.split('\n').map(str::trim) {
        if let Some((version, reason)) = parse_status_line(line) {
            head.protocol_version = version.to_owned();
            head.reason_phrase = (!reason.is_empty()).then(|| reason.to_owned());
            head.headers = Headers::new();
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        head.headers.append(name, value.trim());
    }
    head
}

fn parse_status_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("HTTP/")?;
    let mut parts = rest.splitn(3, ' ');
    let version = parts.next()?;
    let code = parts.next()?;
    if code.len() != 3 || !code.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    Some((version, parts.next().unwrap_or("").trim()))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::{append_query, parse_raw_response, truncate_body};
    use crate::message::Message;
    use crate::transport::RawResponse;

    fn raw(status: u16, head: &str, body: &str) -> RawResponse {
        RawResponse {
            status,
            header_size: head.len(),
            raw: Bytes::from(format!("{head}{body}")),
        }
    }

    #[test]
    fn append_query_picks_separator_from_existing_query() {
        assert_eq!(
            append_query("https://api.example.com", [("q", "a")]),
            "https://api.example.com?q=a"
        );
        assert_eq!(
            append_query("https://api.example.com/s?x=1", [("q", "a"), ("r", "b")]),
            "https://api.example.com/s?x=1&q=a&r=b"
        );
        assert_eq!(
            append_query("https://api.example.com/s#top", [("q", "a&b")]),
            "https://api.example.com/s?q=a%26b#top"
        );
        let empty: [(&str, &str); 0] = [];
        assert_eq!(
            append_query("https://api.example.com", empty),
            "https://api.example.com"
        );
    }

    #[test]
    fn raw_response_is_split_at_header_size() {
        let response = parse_raw_response(&raw(
            200,
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nX-Dup: a\r\nx-dup: b\r\n\r\n",
            r#"{"ok":true}"#,
        ))
        .expect("raw response should split");
        assert_eq!(response.status(), 200);
        assert_eq!(response.reason_phrase(), "OK");
        assert_eq!(response.protocol_version(), "1.1");
        assert_eq!(response.header_line("content-type"), "application/json");
        assert_eq!(response.header("X-DUP"), ["a", "b"]);
        assert_eq!(response.text_lossy(), r#"{"ok":true}"#);
    }

    #[test]
    fn header_values_split_on_first_colon_and_skip_malformed_lines() {
        let response = parse_raw_response(&raw(
            200,
            "HTTP/1.1 200 OK\r\nLocation:  http://a.com:8080/x \r\nnot a header\r\n\r\n",
            "",
        ))
        .expect("raw response should split");
        assert_eq!(response.header("location"), ["http://a.com:8080/x"]);
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn last_status_line_wins_for_redirect_chains() {
        let head = concat!(
            "HTTP/1.1 301 Moved Permanently\r\nLocation: /next\r\n\r\n",
            "HTTP/2 404 \r\nContent-Type: text/plain\r\n\r\n",
        );
        let response = parse_raw_response(&raw(404, head, "missing")).expect("split");
        assert_eq!(response.protocol_version(), "2");
        assert_eq!(response.reason_phrase(), "Not Found");
        assert!(!response.has_header("location"));
        assert_eq!(response.text_lossy(), "missing");
    }

    #[test]
    fn missing_status_line_uses_defaults() {
        let response = parse_raw_response(&raw(299, "X-A: 1\r\n\r\n", "")).expect("split");
        assert_eq!(response.protocol_version(), "1.1");
        assert_eq!(response.reason_phrase(), "Unknown Status Code");
    }

    #[test]
    fn header_size_past_payload_is_rejected() {
        let mut broken = raw(200, "HTTP/1.1 200 OK\r\n\r\n", "");
        broken.header_size += 10;
        assert!(parse_raw_response(&broken).is_none());
    }

    #[test]
    fn truncate_body_marks_long_payloads() {
        let long = "x".repeat(4096);
        let text = truncate_body(long.as_bytes());
        assert!(text.ends_with("...(truncated)"));
        assert_eq!(truncate_body(b"short"), "short");
    }
}
