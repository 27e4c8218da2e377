//! Error type shared by every stage of the request pipeline.
//!
//! # Design
//! One closed enum covers building, encoding, transport, validation and
//! decoding failures, so callers match on a single type no matter where a
//! request went wrong. Underlying causes are held behind `Arc` which keeps the
//! enum `Clone`: a `RequestBuilder` stores the first error it hits and hands a
//! copy back every time it is compiled.

use std::fmt;
use std::str::Utf8Error;
use std::sync::Arc;

use thiserror::Error;

/// Boxed error returned by transports and error decoders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A transport or decoder error shared between clones of an `Error`.
///
/// `source()` yields the wrapped error itself, so walking the chain reaches
/// the caller's concrete type.
#[derive(Debug, Clone)]
pub struct SharedCause(Arc<dyn std::error::Error + Send + Sync>);

impl SharedCause {
    pub fn get(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.0
    }
}

impl From<BoxError> for SharedCause {
    fn from(err: BoxError) -> Self {
        SharedCause(Arc::from(err))
    }
}

impl fmt::Display for SharedCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl std::error::Error for SharedCause {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.0)
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure the pipeline can produce.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The transport answered with a status that is not an HTTP status code.
    #[error("transport returned status {0}, which is not a valid HTTP response")]
    InvalidResponse(u16),

    /// The status code fell outside the acceptable range.
    #[error("invalid HTTP status code: {0}")]
    InvalidStatusCode(u16),

    /// The URL (or URL plus query) could not be parsed.
    #[error("invalid URL: {0:?}")]
    InvalidUrl(String),

    /// A `Content-Type` header names a type no body encoder handles.
    #[error("unsupported content type: {0:?}")]
    InvalidContentType(String),

    /// The transport failed before a response was received.
    #[error("network failure: {0}")]
    NetworkFailure(#[source] SharedCause),

    /// A typed value could not be turned into request parameters.
    #[error("failed to encode parameters: {0}")]
    ParameterEncodingFailure(String),

    /// The response body is not valid UTF-8.
    #[error("response body is not valid UTF-8")]
    RequestStringEncodingFailure(#[source] Utf8Error),

    /// The response body is not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    RequestJsonDecodingFailure(#[source] Arc<serde_json::Error>),

    /// The response JSON does not match the requested type.
    #[error("response JSON does not match the expected type: {0}")]
    RequestDecodableDecodingFailure(#[source] Arc<serde_json::Error>),

    /// A parameter value has no JSON representation.
    #[error("parameter `{key}` cannot be serialized to JSON")]
    JsonSerializationFailure { key: String },

    /// A parameter value has no form url-encoded representation.
    #[error("parameter `{key}` cannot be form url-encoded")]
    UrlEncodingFailure { key: String },

    /// A query value is outside the permitted primitive kinds.
    #[error("invalid query value for `{key}`: {value}")]
    InvalidQueryValue { key: String, value: String },

    /// Error produced by a caller-supplied `ErrorDecoder`.
    #[error("custom error: {0}")]
    Custom(#[source] SharedCause),
}

impl Error {
    /// Wrap a transport error.
    pub fn network(err: BoxError) -> Self {
        Error::NetworkFailure(err.into())
    }

    /// Wrap an error produced by a caller-supplied decoder.
    pub fn custom(err: BoxError) -> Self {
        Error::Custom(err.into())
    }

    pub(crate) fn json_decoding(err: serde_json::Error) -> Self {
        Error::RequestJsonDecodingFailure(Arc::new(err))
    }

    pub(crate) fn decodable_decoding(err: serde_json::Error) -> Self {
        Error::RequestDecodableDecodingFailure(Arc::new(err))
    }

    pub fn is_network_failure(&self) -> bool {
        matches!(self, Error::NetworkFailure(_))
    }

    /// The HTTP status carried by `InvalidStatusCode` or `InvalidResponse`.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::InvalidStatusCode(code) | Error::InvalidResponse(code) => Some(*code),
            _ => None,
        }
    }

    /// The wrapped error of `NetworkFailure` or `Custom`.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Error::NetworkFailure(cause) | Error::Custom(cause) => Some(cause.get()),
            _ => None,
        }
    }

    /// Downcast the payload of `Custom` to the decoder's concrete error type.
    pub fn custom_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Custom(cause) => cause.get().downcast_ref::<E>(),
            _ => None,
        }
    }
}
