//! Response validation and decoding.
//!
//! # Design
//! Validation and each decoding step are plain functions over an
//! `HttpResponse` or its body, so they can be tested with canned responses
//! and reused by any executor. `Client` chains them: validate first, then
//! decode; a failed validation never reaches the body parser.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{BoxError, Error, Result};
use crate::http::{Headers, HttpResponse};

/// Status, URL and headers of a completed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    pub url: String,
    pub headers: Headers,
}

/// A decoded value together with the raw body and the response metadata.
#[derive(Debug, Clone)]
pub struct DataResponse<T> {
    value: T,
    data: Bytes,
    response: ResponseMeta,
}

impl<T> DataResponse<T> {
    pub(crate) fn new(value: T, data: Bytes, response: ResponseMeta) -> Self {
        Self { value, data, response }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Raw response body.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn response(&self) -> &ResponseMeta {
        &self.response
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Turns the body of a rejected response into a caller-defined error.
///
/// Consulted only when the status falls outside the acceptable range.
/// Returning `None` falls back to `Error::InvalidStatusCode`.
pub trait ErrorDecoder: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn decode_error(&self, data: &[u8], response: &ResponseMeta) -> Option<Self::Error>;
}

type DecodeFn = dyn Fn(&[u8], &ResponseMeta) -> Option<BoxError> + Send + Sync;

/// Type-erased, cheaply clonable `ErrorDecoder`.
#[derive(Clone)]
pub struct SharedErrorDecoder(Arc<DecodeFn>);

impl SharedErrorDecoder {
    pub fn new<D: ErrorDecoder>(decoder: D) -> Self {
        Self(Arc::new(move |data: &[u8], meta: &ResponseMeta| {
            decoder
                .decode_error(data, meta)
                .map(|err| Box::new(err) as BoxError)
        }))
    }

    pub fn decode(&self, data: &[u8], response: &ResponseMeta) -> Option<BoxError> {
        (self.0)(data, response)
    }
}

impl fmt::Debug for SharedErrorDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedErrorDecoder").finish_non_exhaustive()
    }
}

/// Split a transport response into metadata and body.
pub fn split(response: HttpResponse) -> (ResponseMeta, Bytes) {
    let meta = ResponseMeta {
        status: response.status,
        url: response.url,
        headers: response.headers,
    };
    (meta, response.body)
}

/// Check that `response` is a real HTTP response with an acceptable status.
///
/// # Errors
/// `InvalidResponse` for a status outside `100..=599`, then `Custom` when
/// `decoder` recognises the body of a rejected response, else
/// `InvalidStatusCode`.
pub fn validate(
    meta: &ResponseMeta,
    data: &[u8],
    acceptable: &Range<u16>,
    decoder: Option<&SharedErrorDecoder>,
) -> Result<()> {
    if !(100..=599).contains(&meta.status) {
        warn!(status = meta.status, url = %meta.url, "transport returned a non-HTTP status");
        return Err(Error::InvalidResponse(meta.status));
    }
    if acceptable.contains(&meta.status) {
        return Ok(());
    }
    warn!(status = meta.status, url = %meta.url, "response status rejected");
    match decoder.and_then(|d| d.decode(data, meta)) {
        Some(custom) => Err(Error::custom(custom)),
        None => Err(Error::InvalidStatusCode(meta.status)),
    }
}

pub fn decode_string(data: &[u8]) -> Result<String> {
    std::str::from_utf8(data)
        .map(str::to_owned)
        .map_err(Error::RequestStringEncodingFailure)
}

pub fn decode_json(data: &[u8]) -> Result<serde_json::Value> {
    serde_json::from_slice(data).map_err(Error::json_decoding)
}

/// Parse the body as JSON, then map it onto `T`.
///
/// A body that is not JSON at all is `RequestJsonDecodingFailure`; valid JSON
/// of the wrong shape is `RequestDecodableDecodingFailure`.
pub fn decode_decodable<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    let json = decode_json(data)?;
    serde_json::from_value(json).map_err(Error::decodable_decoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Post {
        user_id: i64,
        id: i64,
        title: String,
        body: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct NamedPost {
        #[allow(dead_code)]
        user_id: i64,
        #[allow(dead_code)]
        name: String,
    }

    #[derive(Debug)]
    struct ApiProblem(String);

    impl fmt::Display for ApiProblem {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "api problem: {}", self.0)
        }
    }

    impl std::error::Error for ApiProblem {}

    struct ProblemDecoder;

    impl ErrorDecoder for ProblemDecoder {
        type Error = ApiProblem;

        fn decode_error(&self, data: &[u8], _response: &ResponseMeta) -> Option<ApiProblem> {
            let json: serde_json::Value = serde_json::from_slice(data).ok()?;
            Some(ApiProblem(json["message"].as_str()?.to_string()))
        }
    }

    fn meta(status: u16) -> ResponseMeta {
        ResponseMeta {
            status,
            url: "https://example.com/posts/1".to_string(),
            headers: Headers::new(),
        }
    }

    const POST: &[u8] = br#"{"userId":1,"id":1,"title":"t","body":"b"}"#;

    #[test]
    fn accepts_2xx_by_default_range() {
        for status in [200, 201, 204, 299] {
            assert!(validate(&meta(status), b"", &(200..300), None).is_ok());
        }
    }

    #[test]
    fn rejects_404() {
        let err = validate(&meta(404), b"", &(200..300), None).unwrap_err();
        assert!(matches!(err, Error::InvalidStatusCode(404)));
    }

    #[test]
    fn rejects_non_http_status() {
        assert!(matches!(
            validate(&meta(42), b"", &(0..1000), None),
            Err(Error::InvalidResponse(42))
        ));
        assert!(matches!(
            validate(&meta(600), b"", &(200..300), None),
            Err(Error::InvalidResponse(600))
        ));
    }

    #[test]
    fn error_decoder_produces_custom_error() {
        let decoder = SharedErrorDecoder::new(ProblemDecoder);
        let err = validate(&meta(422), br#"{"message":"title missing"}"#, &(200..300), Some(&decoder))
            .unwrap_err();
        assert_eq!(err.custom_ref::<ApiProblem>().unwrap().0, "title missing");
    }

    #[test]
    fn error_decoder_falls_back_to_status() {
        let decoder = SharedErrorDecoder::new(ProblemDecoder);
        let err = validate(&meta(500), b"oops", &(200..300), Some(&decoder)).unwrap_err();
        assert!(matches!(err, Error::InvalidStatusCode(500)));
    }

    #[test]
    fn error_decoder_not_consulted_on_success() {
        let decoder = SharedErrorDecoder::new(ProblemDecoder);
        assert!(validate(&meta(200), br#"{"message":"x"}"#, &(200..300), Some(&decoder)).is_ok());
    }

    #[test]
    fn string_decoding() {
        assert_eq!(decode_string(b"hello").unwrap(), "hello");
        assert!(matches!(
            decode_string(&[0xff, 0xfe, 0xfd]),
            Err(Error::RequestStringEncodingFailure(_))
        ));
    }

    #[test]
    fn json_decoding() {
        assert_eq!(decode_json(POST).unwrap()["title"], "t");
        assert!(matches!(decode_json(b"not json"), Err(Error::RequestJsonDecodingFailure(_))));
    }

    #[test]
    fn decodable_matching_payload() {
        let post: Post = decode_decodable(POST).unwrap();
        assert_eq!(
            post,
            Post {
                user_id: 1,
                id: 1,
                title: "t".to_string(),
                body: "b".to_string(),
            }
        );
    }

    #[test]
    fn decodable_missing_field() {
        let err = decode_decodable::<NamedPost>(POST).unwrap_err();
        assert!(matches!(err, Error::RequestDecodableDecodingFailure(_)));
    }

    #[test]
    fn decodable_invalid_json() {
        let err = decode_decodable::<Post>(&[0xff; 32]).unwrap_err();
        assert!(matches!(err, Error::RequestJsonDecodingFailure(_)));
    }

    #[test]
    fn split_keeps_body() {
        let (meta, body) = split(HttpResponse {
            status: 200,
            url: "u".to_string(),
            headers: Headers::new(),
            body: Bytes::from_static(b"x"),
        });
        assert_eq!(meta.status, 200);
        assert_eq!(&body[..], b"x");
    }
}
