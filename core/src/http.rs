//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The crate
//! builds `HttpRequest` values and decodes `HttpResponse` values without ever
//! touching the network; a `Transport` supplied by the caller performs the
//! actual I/O. All fields use owned types so values move freely across tasks
//! and threads.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CONTENT_TYPE: &str = "Content-Type";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single header. Names compare case-insensitively inside `Headers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn content_type(value: impl Into<String>) -> Self {
        Self::new(CONTENT_TYPE, value)
    }

    pub fn accept(value: impl Into<String>) -> Self {
        Self::new("Accept", value)
    }

    pub fn authorization(value: impl Into<String>) -> Self {
        Self::new("Authorization", value)
    }

    pub fn user_agent(value: impl Into<String>) -> Self {
        Self::new("User-Agent", value)
    }

    pub fn custom(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value)
    }
}

/// Ordered header list with case-insensitive names.
///
/// Inserting a header whose name already exists replaces its value in place;
/// every other entry is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "std::collections::BTreeMap<String, String>")]
#[serde(into = "std::collections::BTreeMap<String, String>")]
pub struct Headers(Vec<Header>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: Header) {
        match self.0.iter_mut().find(|h| h.name.eq_ignore_ascii_case(&header.name)) {
            Some(existing) => existing.value = header.value,
            None => self.0.push(header),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Merge `other` into `self`; entries from `other` win on name clashes.
    pub fn merge(mut self, other: Headers) -> Headers {
        for header in other.0 {
            self.insert(header);
        }
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get(CONTENT_TYPE)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<I: IntoIterator<Item = Header>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for header in iter {
            headers.insert(header);
        }
        headers
    }
}

impl<const N: usize> From<[Header; N]> for Headers {
    fn from(headers: [Header; N]) -> Self {
        headers.into_iter().collect()
    }
}

impl From<Vec<(String, String)>> for Headers {
    fn from(pairs: Vec<(String, String)>) -> Self {
        pairs.into_iter().map(|(name, value)| Header::new(name, value)).collect()
    }
}

impl From<std::collections::BTreeMap<String, String>> for Headers {
    fn from(map: std::collections::BTreeMap<String, String>) -> Self {
        map.into_iter().map(|(name, value)| Header::new(name, value)).collect()
    }
}

impl From<Headers> for std::collections::BTreeMap<String, String> {
    fn from(headers: Headers) -> Self {
        headers.0.into_iter().map(|h| (h.name, h.value)).collect()
    }
}

impl IntoIterator for Headers {
    type Item = Header;
    type IntoIter = std::vec::IntoIter<Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A fully resolved HTTP request described as plain data.
///
/// Produced by `RequestBuilder::compile`. The transport consumes it and
/// answers with the corresponding `HttpResponse`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Correlation id of the builder this request was compiled from.
    pub id: Uuid,
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Bytes>,
}

/// An HTTP response described as plain data, as returned by a transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Final URL of the response, after any redirects the transport followed.
    pub url: String,
    pub headers: Headers,
    pub body: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_case_insensitively() {
        let mut headers = Headers::from([Header::content_type("text/plain"), Header::accept("*/*")]);
        headers.insert(Header::new("content-type", "application/json"));
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        // position of the replaced entry is kept
        assert_eq!(headers.iter().next().unwrap().value, "application/json");
    }

    #[test]
    fn merge_keeps_unrelated_entries() {
        let old = Headers::from([Header::accept("text/html"), Header::user_agent("a")]);
        let new = Headers::from([Header::new("ACCEPT", "application/json"), Header::custom("X-Id", "7")]);
        let merged = old.merge(new);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("accept"), Some("application/json"));
        assert_eq!(merged.get("user-agent"), Some("a"));
        assert_eq!(merged.get("x-id"), Some("7"));
    }

    #[test]
    fn headers_deserialize_from_map() {
        let headers: Headers = serde_json::from_str(r#"{"Accept":"application/json"}"#).unwrap();
        assert_eq!(headers.get("accept"), Some("application/json"));
    }

    #[test]
    fn method_displays_uppercase() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(HttpMethod::default(), HttpMethod::Get);
    }
}
