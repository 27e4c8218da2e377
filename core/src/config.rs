//! Client-wide defaults.
//!
//! `ClientConfig` can be built in code or deserialized from a host
//! application's own configuration (any serde format); every field is
//! optional there.

use std::ops::Range;

use serde::Deserialize;

use crate::http::{Header, Headers};
use crate::request::DEFAULT_ACCEPTABLE_STATUS;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Added to every request; a header set on the request itself wins.
    pub default_headers: Headers,
    /// Used when a request did not install its own validation.
    pub acceptable_status: Range<u16>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_headers: Headers::new(),
            acceptable_status: DEFAULT_ACCEPTABLE_STATUS,
        }
    }
}

impl ClientConfig {
    pub fn with_default_header(mut self, header: Header) -> Self {
        self.default_headers.insert(header);
        self
    }

    pub fn with_acceptable_status(mut self, acceptable: Range<u16>) -> Self {
        self.acceptable_status = acceptable;
        self
    }

    /// Put the default headers underneath `headers`.
    pub(crate) fn apply_defaults(&self, headers: Headers) -> Headers {
        self.default_headers.clone().merge(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert!(config.default_headers.is_empty());
        assert_eq!(config.acceptable_status, 200..300);
    }

    #[test]
    fn deserializes_partial_config() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"default_headers":{"User-Agent":"courier/0.1","Accept":"application/json"}}"#,
        )
        .unwrap();
        assert_eq!(config.default_headers.get("user-agent"), Some("courier/0.1"));
        assert_eq!(config.acceptable_status, 200..300);

        let config: ClientConfig =
            serde_json::from_str(r#"{"acceptable_status":{"start":200,"end":400}}"#).unwrap();
        assert_eq!(config.acceptable_status, 200..400);
    }

    #[test]
    fn request_headers_override_defaults() {
        let config = ClientConfig::default()
            .with_default_header(Header::accept("*/*"))
            .with_default_header(Header::user_agent("courier"));
        let merged = config.apply_defaults(Headers::from([Header::accept("application/json")]));
        assert_eq!(merged.get("accept"), Some("application/json"));
        assert_eq!(merged.get("user-agent"), Some("courier"));
    }
}
