//! Query, JSON and form encoders, and the content-type rule that picks one.
//!
//! # Design
//! Every function here is pure. Queries and form bodies share one flattening
//! step: objects become `key[sub]`, arrays become repeated `key[]` pairs, and
//! `Null` becomes an empty value. The caller maps a flattening failure to the
//! error kind of its own encoder, so the offending key is always reported.

use bytes::Bytes;
use url::Url;

use crate::error::{Error, Result};
use crate::http::Headers;
use crate::params::{ParamValue, Parameters, Queries};

pub const APPLICATION_JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Which encoder, if any, produces the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    None,
    Json,
    Form,
}

impl BodyEncoding {
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            BodyEncoding::None => None,
            BodyEncoding::Json => Some(APPLICATION_JSON),
            BodyEncoding::Form => Some(FORM_URLENCODED),
        }
    }
}

/// Shape of the body a builder holds, as far as encoder selection cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Empty,
    /// Bytes sent verbatim.
    Raw,
    /// A `Parameters` map.
    Parameters,
    /// A value already serialized to a JSON document.
    Encodable,
}

/// Pick the body encoder from the declared `Content-Type` and the body kind.
///
/// Raw and empty bodies never go through an encoder, so their content type is
/// not inspected. Mapped bodies default to JSON; a declared type other than
/// JSON or form is rejected before anything is encoded.
pub fn resolve_body_encoding(headers: Option<&Headers>, kind: BodyKind) -> Result<BodyEncoding> {
    if matches!(kind, BodyKind::Empty | BodyKind::Raw) {
        return Ok(BodyEncoding::None);
    }
    let Some(declared) = headers.and_then(Headers::content_type) else {
        return Ok(BodyEncoding::Json);
    };
    let essence = declared.split(';').next().unwrap_or_default().trim();
    if essence.eq_ignore_ascii_case(APPLICATION_JSON) {
        Ok(BodyEncoding::Json)
    } else if essence.eq_ignore_ascii_case(FORM_URLENCODED) {
        Ok(BodyEncoding::Form)
    } else {
        Err(Error::InvalidContentType(declared.to_string()))
    }
}

/// Flatten a map into `(key, text)` pairs.
///
/// On failure returns the flattened key and the offending value.
fn flatten(map: &Parameters) -> std::result::Result<Vec<(String, String)>, (String, &ParamValue)> {
    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        flatten_value(key.clone(), value, &mut pairs)?;
    }
    Ok(pairs)
}

fn flatten_value<'a>(
    key: String,
    value: &'a ParamValue,
    pairs: &mut Vec<(String, String)>,
) -> std::result::Result<(), (String, &'a ParamValue)> {
    match value {
        ParamValue::Array(items) => {
            let key = format!("{key}[]");
            for item in items {
                flatten_value(key.clone(), item, pairs)?;
            }
        }
        ParamValue::Object(map) => {
            for (sub, item) in map {
                flatten_value(format!("{key}[{sub}]"), item, pairs)?;
            }
        }
        scalar => match scalar.as_field_text() {
            Some(text) => pairs.push((key, text)),
            None => return Err((key, scalar)),
        },
    }
    Ok(())
}

/// Encode queries as `a=1&b=x`, percent-escaped.
pub fn encode_query(queries: &Queries) -> Result<String> {
    let pairs = flatten(queries).map_err(|(key, value)| Error::InvalidQueryValue {
        key,
        value: value.to_string(),
    })?;
    Ok(url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish())
}

/// Parse `raw` and append the encoded `queries`, keeping any query the URL
/// already carries.
pub fn append_query(raw: &str, queries: Option<&Queries>) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|_| Error::InvalidUrl(raw.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl(raw.to_string()));
    }
    let Some(queries) = queries.filter(|q| !q.is_empty()) else {
        return Ok(url);
    };
    let pairs = flatten(queries).map_err(|(key, value)| Error::InvalidQueryValue {
        key,
        value: value.to_string(),
    })?;
    url.query_pairs_mut().extend_pairs(pairs);
    Ok(url)
}

/// Encode parameters as a JSON object.
pub fn encode_json(parameters: &Parameters) -> Result<Bytes> {
    let mut object = serde_json::Map::new();
    for (key, value) in parameters {
        let json = value
            .to_json(key)
            .map_err(|key| Error::JsonSerializationFailure { key })?;
        object.insert(key.clone(), json);
    }
    serde_json::to_vec(&serde_json::Value::Object(object))
        .map(Bytes::from)
        .map_err(|e| Error::ParameterEncodingFailure(e.to_string()))
}

/// Encode parameters as an `application/x-www-form-urlencoded` body.
pub fn encode_form(parameters: &Parameters) -> Result<Bytes> {
    let pairs = flatten(parameters).map_err(|(key, _)| Error::UrlEncodingFailure { key })?;
    serde_urlencoded::to_string(pairs)
        .map(Bytes::from)
        .map_err(|_| Error::UrlEncodingFailure { key: String::new() })
}
