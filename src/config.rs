use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::Result;
use crate::error::Error;
use crate::headers::Headers;
use crate::rate_limit::RateLimitPolicy;
use crate::retry::ExponentialBackoff;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const MIN_TIMEOUT: Duration = Duration::from_millis(1);

/// Client options as loaded from a configuration document.
///
/// Every field is optional in the document. Durations are written the way
/// their key says: `timeout` and `rate_limit_window` in seconds (fractions
/// allowed for `timeout`), `retry_base_delay_ms` in milliseconds.
///
/// ```
/// let config = reqkit::ClientConfig::from_json_str(
///     r#"{"timeout": 2.5, "headers": {"User-Agent": "demo/1.0"}, "rate_limit": 100}"#,
/// )?;
/// assert_eq!(config.timeout, std::time::Duration::from_millis(2500));
/// assert_eq!(config.rate_limit, 100);
/// assert!(config.http_errors);
/// # Ok::<(), reqkit::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(deserialize_with = "seconds_f64")]
    pub timeout: Duration,
    pub allow_redirects: bool,
    pub http_errors: bool,
    pub verify_tls: bool,
    pub headers: Headers,
    pub rate_limit: usize,
    #[serde(deserialize_with = "seconds_u64")]
    pub rate_limit_window: Duration,
    pub retry_max_attempts: usize,
    #[serde(rename = "retry_base_delay_ms", deserialize_with = "millis_u64")]
    pub retry_base_delay: Duration,
}

impl ClientConfig {
    pub fn from_json_str(document: &str) -> Result<Self> {
        serde_json::from_str(document).map_err(|source| Error::InvalidConfig { source })
    }

    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::standard()
            .limit(self.rate_limit)
            .window(self.rate_limit_window)
    }

    pub fn retry_strategy(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.retry_max_attempts, self.retry_base_delay)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        let rate_limit = RateLimitPolicy::standard();
        let retry = ExponentialBackoff::standard();
        Self {
            timeout: DEFAULT_TIMEOUT,
            allow_redirects: true,
            http_errors: true,
            verify_tls: true,
            headers: Headers::new(),
            rate_limit: rate_limit.configured_limit(),
            rate_limit_window: rate_limit.configured_window(),
            retry_max_attempts: retry.configured_max_attempts(),
            retry_base_delay: retry.configured_base_delay(),
        }
    }
}

fn seconds_f64<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(seconds)
        .map(|timeout| timeout.max(MIN_TIMEOUT))
        .map_err(serde::de::Error::custom)
}

fn seconds_u64<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

fn millis_u64<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ClientConfig;
    use crate::error::Error;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ClientConfig::from_json_str("{}").expect("empty config");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.rate_limit, 10);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert_eq!(config.retry_max_attempts, 3);
        assert_eq!(config.retry_base_delay, Duration::from_millis(1000));
        assert!(config.allow_redirects && config.http_errors && config.verify_tls);
    }

    #[test]
    fn zero_timeout_is_raised_to_the_minimum() {
        let config = ClientConfig::from_json_str(r#"{"timeout": 0}"#).expect("zero timeout");
        assert_eq!(config.timeout, Duration::from_millis(1));
    }

    #[test]
    fn every_field_is_read_in_its_unit() {
        let config = ClientConfig::from_json_str(
            r#"{
                "timeout": 0.5,
                "allow_redirects": false,
                "http_errors": false,
                "verify_tls": false,
                "headers": {"Accept": ["application/json", "text/plain"]},
                "rate_limit": 3,
                "rate_limit_window": 5,
                "retry_max_attempts": 4,
                "retry_base_delay_ms": 250
            }"#,
        )
        .expect("full config");
        assert_eq!(config.timeout, Duration::from_millis(500));
        assert!(!config.allow_redirects);
        assert!(!config.http_errors);
        assert!(!config.verify_tls);
        assert_eq!(config.headers.get_line("accept"), "application/json, text/plain");
        assert_eq!(config.rate_limit_policy().configured_limit(), 3);
        assert_eq!(
            config.rate_limit_policy().configured_window(),
            Duration::from_secs(5)
        );
        assert_eq!(config.retry_strategy().configured_max_attempts(), 4);
        assert_eq!(
            config.retry_strategy().configured_base_delay(),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn invalid_documents_are_reported_as_config_errors() {
        for document in [
            r#"{"timeout": -1}"#,
            r#"{"rate_limit": "ten"}"#,
            r#"{"unknown_option": true}"#,
            "not json",
        ] {
            let error = ClientConfig::from_json_str(document).expect_err(document);
            assert!(matches!(error, Error::InvalidConfig { .. }), "{document}");
        }
    }
}
