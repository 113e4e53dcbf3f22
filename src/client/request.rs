use bytes::Bytes;
use serde::Serialize;

use crate::Result;
use crate::error::Error;
use crate::headers::{Headers, IntoHeaderValues};

const CONTENT_TYPE: &str = "Content-Type";

/// Per-call additions for the convenience verbs on
/// [`HttpClient`](crate::HttpClient).
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub(super) query: Vec<(String, String)>,
    pub(super) headers: Headers,
    pub(super) body: Option<Bytes>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_pair(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn query_pairs<K, V, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.query.extend(
            pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into())),
        );
        self
    }

    /// Flattens a serializable struct or map into query pairs.
    pub fn query_params<T>(mut self, params: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let encoded = serde_urlencoded::to_string(params)
            .map_err(|source| Error::SerializeQuery { source })?;
        self.query.extend(
            url::form_urlencoded::parse(encoded.as_bytes())
                .map(|(name, value)| (name.into_owned(), value.into_owned())),
        );
        Ok(self)
    }

    /// Replaces any earlier value given for `name`.
    pub fn header(mut self, name: &str, values: impl IntoHeaderValues) -> Self {
        self.headers.set(name, values);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `payload` as the body and sets `Content-Type` unless one was
    /// already given.
    pub fn json<T>(self, payload: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(payload).map_err(|source| Error::Serialize { source })?;
        let with_body = self.body(body);
        if with_body.headers.contains(CONTENT_TYPE) {
            return Ok(with_body);
        }
        Ok(with_body.header(CONTENT_TYPE, "application/json"))
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::RequestOptions;

    #[derive(Serialize)]
    struct Search<'a> {
        q: &'a str,
        page: u32,
    }

    #[test]
    fn query_params_flatten_in_field_order() {
        let options = RequestOptions::new()
            .query_pair("lang", "en")
            .query_params(&Search { q: "a b", page: 2 })
            .expect("query params");
        assert_eq!(
            options.query,
            [
                ("lang".to_owned(), "en".to_owned()),
                ("q".to_owned(), "a b".to_owned()),
                ("page".to_owned(), "2".to_owned()),
            ]
        );
    }

    #[test]
    fn json_sets_body_and_default_content_type() {
        let options = RequestOptions::new()
            .json(&serde_json::json!({"name": "reqkit"}))
            .expect("json body");
        assert_eq!(
            options.body.as_deref(),
            Some(br#"{"name":"reqkit"}"#.as_slice())
        );
        assert_eq!(options.headers.get_line("content-type"), "application/json");

        let custom = RequestOptions::new()
            .header("content-type", "application/vnd.api+json")
            .json(&[1, 2, 3])
            .expect("json body");
        assert_eq!(
            custom.headers.get_line("Content-Type"),
            "application/vnd.api+json"
        );
    }

    #[test]
    fn non_map_query_params_are_rejected() {
        let error = RequestOptions::new()
            .query_params(&[1, 2, 3])
            .expect_err("sequence of scalars is not a query");
        assert_eq!(error.code().as_str(), "serialize_query");
    }
}
