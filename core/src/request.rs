//! Fluent request builder with deferred error reporting.
//!
//! # Design
//! `RequestBuilder` accumulates method, queries, body, headers and validation
//! rules without doing any I/O. A mutator that fails (for example a typed
//! value that cannot become a parameter map) records the error instead of
//! returning it; every later mutator is then a no-op and `compile` hands the
//! recorded error back. The first error always wins.

use std::ops::Range;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::encoding::{append_query, encode_form, encode_json, resolve_body_encoding, BodyEncoding, BodyKind};
use crate::error::{Error, Result};
use crate::http::{Header, Headers, HttpMethod, HttpRequest, CONTENT_TYPE};
use crate::params::{parameters_from_json, Parameters, Queries};
use crate::response::{ErrorDecoder, SharedErrorDecoder};

/// Status range accepted when no other validation is installed.
pub const DEFAULT_ACCEPTABLE_STATUS: Range<u16> = 200..300;

#[derive(Debug, Clone)]
enum Body {
    Empty,
    Raw(Bytes),
    Parameters(Parameters),
    Encodable(serde_json::Value),
}

impl Body {
    fn kind(&self) -> BodyKind {
        match self {
            Body::Empty => BodyKind::Empty,
            Body::Raw(_) => BodyKind::Raw,
            Body::Parameters(_) => BodyKind::Parameters,
            Body::Encodable(_) => BodyKind::Encodable,
        }
    }
}

/// Describes one HTTP request.
///
/// ```
/// use courier_core::{params, Header, RequestBuilder};
///
/// let request = RequestBuilder::new("https://example.com/posts")
///     .post()
///     .add_parameters(params! { "title" => "foo", "userId" => 1 })
///     .add_headers([Header::content_type("application/json")].into())
///     .compile()
///     .unwrap();
/// assert_eq!(request.url, "https://example.com/posts");
/// ```
#[derive(Debug, Clone)]
#[must_use = "RequestBuilder does nothing until it is compiled or sent"]
pub struct RequestBuilder {
    id: Uuid,
    url: String,
    method: HttpMethod,
    queries: Option<Queries>,
    body: Body,
    headers: Option<Headers>,
    acceptable_status: Option<Range<u16>>,
    error_decoder: Option<SharedErrorDecoder>,
    error: Option<Error>,
}

impl RequestBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), url)
    }

    /// Create a builder with a caller-chosen correlation id.
    pub fn with_id(id: Uuid, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            method: HttpMethod::Get,
            queries: None,
            body: Body::Empty,
            headers: None,
            acceptable_status: None,
            error_decoder: None,
            error: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn http_method(&self) -> HttpMethod {
        self.method
    }

    /// The error recorded by an earlier mutator, if any.
    pub fn pending_error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// The range installed by `validate` / `validate_status`, if any.
    pub fn acceptable_status(&self) -> Option<&Range<u16>> {
        self.acceptable_status.as_ref()
    }

    pub(crate) fn error_decoder(&self) -> Option<&SharedErrorDecoder> {
        self.error_decoder.as_ref()
    }

    fn blocked(&self, op: &'static str) -> bool {
        match &self.error {
            Some(err) => {
                trace!(request_id = %self.id, op, error = %err, "builder call ignored, error already recorded");
                true
            }
            None => false,
        }
    }

    fn record(&mut self, err: Error) {
        trace!(request_id = %self.id, error = %err, "builder recorded error");
        self.error.get_or_insert(err);
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        if self.blocked("method") {
            return self;
        }
        self.method = method;
        self
    }

    pub fn get(self) -> Self {
        self.method(HttpMethod::Get)
    }

    pub fn post(self) -> Self {
        self.method(HttpMethod::Post)
    }

    pub fn put(self) -> Self {
        self.method(HttpMethod::Put)
    }

    pub fn patch(self) -> Self {
        self.method(HttpMethod::Patch)
    }

    pub fn delete(self) -> Self {
        self.method(HttpMethod::Delete)
    }

    /// Merge `queries` into the existing ones; new keys override.
    pub fn add_queries(mut self, queries: Queries) -> Self {
        if self.blocked("add_queries") {
            return self;
        }
        self.queries.get_or_insert_with(Queries::new).extend(queries);
        self
    }

    /// Merge `parameters` into the body parameters; new keys override.
    ///
    /// A raw or encoded body set earlier is replaced.
    pub fn add_parameters(mut self, parameters: Parameters) -> Self {
        if self.blocked("add_parameters") {
            return self;
        }
        match &mut self.body {
            Body::Parameters(existing) => existing.extend(parameters),
            _ => self.body = Body::Parameters(parameters),
        }
        self
    }

    /// Replace the body parameters with the fields of a serializable value.
    ///
    /// The value must serialize to a JSON object; anything else records
    /// `Error::ParameterEncodingFailure` and leaves the builder unchanged.
    pub fn parameters_from<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        if self.blocked("parameters_from") {
            return self;
        }
        let converted = serde_json::to_value(value)
            .map_err(|e| e.to_string())
            .and_then(parameters_from_json);
        match converted {
            Ok(parameters) => self.body = Body::Parameters(parameters),
            Err(reason) => self.record(Error::ParameterEncodingFailure(reason)),
        }
        self
    }

    /// Use the JSON encoding of `value` as the body.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        let encoded = serde_json::to_value(value).map_err(|e| e.to_string());
        self.encoded(encoded)
    }

    pub(crate) fn encoded(mut self, encoded: std::result::Result<serde_json::Value, String>) -> Self {
        if self.blocked("json") {
            return self;
        }
        match encoded {
            Ok(value) => self.body = Body::Encodable(value),
            Err(reason) => self.record(Error::ParameterEncodingFailure(reason)),
        }
        self
    }

    /// Send `body` verbatim.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        if self.blocked("body") {
            return self;
        }
        self.body = Body::Raw(body.into());
        self
    }

    /// Merge `headers`; same-named entries are replaced.
    pub fn add_headers(mut self, headers: Headers) -> Self {
        if self.blocked("add_headers") {
            return self;
        }
        self.headers = Some(match self.headers.take() {
            Some(existing) => existing.merge(headers),
            None => headers,
        });
        self
    }

    pub fn header(self, header: Header) -> Self {
        self.add_headers(Headers::from([header]))
    }

    /// Accept only `200..300` responses.
    pub fn validate(self) -> Self {
        self.validate_status(DEFAULT_ACCEPTABLE_STATUS)
    }

    /// Accept only responses whose status lies in `acceptable`.
    pub fn validate_status(mut self, acceptable: Range<u16>) -> Self {
        if self.blocked("validate") {
            return self;
        }
        self.acceptable_status = Some(acceptable);
        self
    }

    /// Turn bodies of rejected responses into `Error::Custom` with `decoder`.
    pub fn decode_errors_with<D: ErrorDecoder>(mut self, decoder: D) -> Self {
        if self.blocked("decode_errors_with") {
            return self;
        }
        self.error_decoder = Some(SharedErrorDecoder::new(decoder));
        self
    }

    pub(crate) fn shared_error_decoder(mut self, decoder: Option<SharedErrorDecoder>) -> Self {
        if self.blocked("decode_errors_with") {
            return self;
        }
        if decoder.is_some() {
            self.error_decoder = decoder;
        }
        self
    }

    /// Resolve everything into a transport-ready `HttpRequest`.
    ///
    /// # Errors
    /// The recorded builder error if there is one, otherwise `InvalidUrl`,
    /// `InvalidQueryValue`, `InvalidContentType` or a body encoding error.
    pub fn compile(&self) -> Result<HttpRequest> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        let url = append_query(&self.url, self.queries.as_ref())?;
        let encoding = resolve_body_encoding(self.headers.as_ref(), self.body.kind())?;

        let body = match (&self.body, encoding) {
            (Body::Empty, _) => None,
            (Body::Raw(bytes), _) => Some(bytes.clone()),
            (Body::Parameters(parameters), BodyEncoding::Form) => Some(encode_form(parameters)?),
            (Body::Parameters(parameters), _) => Some(encode_json(parameters)?),
            (Body::Encodable(value), BodyEncoding::Form) => {
                let parameters =
                    parameters_from_json(value.clone()).map_err(Error::ParameterEncodingFailure)?;
                Some(encode_form(&parameters)?)
            }
            (Body::Encodable(value), _) => Some(Bytes::from(
                serde_json::to_vec(value).map_err(|e| Error::ParameterEncodingFailure(e.to_string()))?,
            )),
        };

        let mut headers = self.headers.clone().unwrap_or_default();
        if let Some(content_type) = encoding.content_type() {
            if !headers.contains(CONTENT_TYPE) {
                headers.insert(Header::content_type(content_type));
            }
        }

        debug!(
            request_id = %self.id,
            method = %self.method,
            url = %url,
            body_len = body.as_ref().map_or(0, Bytes::len),
            "compiled request"
        );

        Ok(HttpRequest {
            id: self.id,
            method: self.method,
            url: url.into(),
            headers,
            body,
        })
    }
}
