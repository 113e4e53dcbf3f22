use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

/// Header values keyed by case-insensitive name.
///
/// Every name maps to an ordered list of values. Names keep the spelling of
/// their latest `set` and the position of their first insertion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<HeaderEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct HeaderEntry {
    name: String,
    values: Vec<String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Values for `name`, empty when absent.
    pub fn get(&self, name: &str) -> &[String] {
        self.position(name)
            .map(|index| self.entries[index].values.as_slice())
            .unwrap_or_default()
    }

    pub fn get_line(&self, name: &str) -> String {
        self.get(name).join(", ")
    }

    /// Replaces every value of `name`.
    pub fn set(&mut self, name: &str, values: impl IntoHeaderValues) {
        let values = values.into_header_values();
        match self.position(name) {
            Some(index) => {
                let entry = &mut self.entries[index];
                entry.name = name.to_owned();
                entry.values = values;
            }
            None => self.entries.push(HeaderEntry {
                name: name.to_owned(),
                values,
            }),
        }
    }

    /// Appends to the values of `name`, creating it when absent.
    pub fn append(&mut self, name: &str, values: impl IntoHeaderValues) {
        let values = values.into_header_values();
        match self.position(name) {
            Some(index) => self.entries[index].values.extend(values),
            None => self.entries.push(HeaderEntry {
                name: name.to_owned(),
                values,
            }),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        let index = self.position(name)?;
        Some(self.entries.remove(index).values)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.values.as_slice()))
    }

    /// `overrides` replaces `self` name by name.
    pub(crate) fn merged_with(&self, overrides: &Headers) -> Headers {
        let mut merged = self.clone();
        for (name, values) in overrides.iter() {
            merged.set(name, values);
        }
        merged
    }

    /// One `(name, "v1, v2")` pair per name, as handed to a transport.
    pub(crate) fn to_lines(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(name, values)| (name.to_owned(), values.join(", ")))
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.name.eq_ignore_ascii_case(name))
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: AsRef<str>,
    V: IntoHeaderValues,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        headers.extend(iter);
        headers
    }
}

impl<N, V> Extend<(N, V)> for Headers
where
    N: AsRef<str>,
    V: IntoHeaderValues,
{
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        for (name, values) in iter {
            self.append(name.as_ref(), values);
        }
    }
}

/// Scalar or list header values, normalized to a list.
pub trait IntoHeaderValues {
    fn into_header_values(self) -> Vec<String>;
}

impl IntoHeaderValues for &str {
    fn into_header_values(self) -> Vec<String> {
        vec![self.to_owned()]
    }
}

impl IntoHeaderValues for String {
    fn into_header_values(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoHeaderValues for &String {
    fn into_header_values(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl IntoHeaderValues for Vec<String> {
    fn into_header_values(self) -> Vec<String> {
        self
    }
}

impl IntoHeaderValues for Vec<&str> {
    fn into_header_values(self) -> Vec<String> {
        self.into_iter().map(str::to_owned).collect()
    }
}

impl IntoHeaderValues for &[String] {
    fn into_header_values(self) -> Vec<String> {
        self.to_vec()
    }
}

impl<const N: usize> IntoHeaderValues for [&str; N] {
    fn into_header_values(self) -> Vec<String> {
        self.into_iter().map(str::to_owned).collect()
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl IntoHeaderValues for OneOrMany {
    fn into_header_values(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Accepts `{"name": "value"}` and `{"name": ["v1", "v2"]}` maps, keeping
/// document order.
impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of header names to a string or a list of strings")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut headers = Headers::new();
                while let Some((name, values)) = access.next_entry::<String, OneOrMany>()? {
                    headers.append(&name, values);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::Headers;

    #[test]
    fn lookups_ignore_case() {
        let mut headers = Headers::new();
        headers.set("X-A", "v");
        assert_eq!(headers.get("x-a"), ["v"]);
        assert!(headers.contains("X-a"));
        assert!(headers.get("x-missing").is_empty());
        assert_eq!(headers.get_line("x-missing"), "");
    }

    #[test]
    fn append_creates_or_extends_in_order() {
        let mut headers = Headers::new();
        headers.append("Accept", "text/html");
        headers.append("accept", ["application/json", "*/*"]);
        assert_eq!(headers.get_line("ACCEPT"), "text/html, application/json, */*");
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn set_keeps_position_and_takes_latest_spelling() {
        let mut headers: Headers = [("A", "1"), ("B", "2")].into_iter().collect();
        headers.set("a", "3");
        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "B"]);
        assert_eq!(headers.get("A"), ["3"]);
    }

    #[test]
    fn merged_with_lets_overrides_win_per_name() {
        let defaults: Headers = [("User-Agent", "reqkit"), ("Accept", "*/*")]
            .into_iter()
            .collect();
        let overrides: Headers = [("accept", "application/json")].into_iter().collect();
        let merged = defaults.merged_with(&overrides);
        assert_eq!(merged.get("Accept"), ["application/json"]);
        assert_eq!(merged.get("user-agent"), ["reqkit"]);
        assert_eq!(
            merged.to_lines(),
            [
                ("User-Agent".to_owned(), "reqkit".to_owned()),
                ("accept".to_owned(), "application/json".to_owned()),
            ]
        );
    }

    #[test]
    fn deserializes_scalar_and_list_values() {
        let headers: Headers =
            serde_json::from_str(r#"{"X-Trace": "abc", "Accept": ["a", "b"]}"#)
                .expect("headers should deserialize");
        assert_eq!(headers.get("x-trace"), ["abc"]);
        assert_eq!(headers.get("accept"), ["a", "b"]);
        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["X-Trace", "Accept"]);
    }
}
