//! Loosely-typed key/value data for queries and request bodies.
//!
//! # Design
//! `ParamValue` is a closed set: the JSON primitives, arrays and objects of
//! the same, plus two kinds (`Binary`, `NonFinite`) that exist only so callers
//! can hand them in and get a typed error back from the encoders instead of a
//! silently dropped or coerced field. Maps are `BTreeMap` so every encoder
//! walks keys in the same order and produces canonical output.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde_json::Number;

/// Key/value pairs appended to the request URL.
pub type Queries = BTreeMap<String, ParamValue>;

/// Key/value pairs encoded into the request body.
pub type Parameters = BTreeMap<String, ParamValue>;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<ParamValue>),
    Object(BTreeMap<String, ParamValue>),
    /// Raw bytes. No encoder accepts these.
    Binary(Bytes),
    /// `NaN` or an infinity. No encoder accepts these.
    NonFinite(f64),
}

impl ParamValue {
    /// Convert to a JSON value, reporting the path of the first value that
    /// has no JSON form.
    pub(crate) fn to_json(&self, key: &str) -> Result<serde_json::Value, String> {
        Ok(match self {
            ParamValue::Null => serde_json::Value::Null,
            ParamValue::Bool(b) => serde_json::Value::Bool(*b),
            ParamValue::Number(n) => serde_json::Value::Number(n.clone()),
            ParamValue::String(s) => serde_json::Value::String(s.clone()),
            ParamValue::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| item.to_json(&format!("{key}[{i}]")))
                    .collect::<Result<_, _>>()?,
            ),
            ParamValue::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), v.to_json(&format!("{key}[{k}]"))?)))
                    .collect::<Result<_, String>>()?,
            ),
            ParamValue::Binary(_) | ParamValue::NonFinite(_) => return Err(key.to_string()),
        })
    }

    /// Text form of a scalar as it appears in a query or form field.
    /// `None` for containers and non-representable values.
    pub(crate) fn as_field_text(&self) -> Option<String> {
        match self {
            ParamValue::Null => Some(String::new()),
            ParamValue::Bool(b) => Some(b.to_string()),
            ParamValue::Number(n) => Some(n.to_string()),
            ParamValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Binary(bytes) => write!(f, "<binary: {} bytes>", bytes.len()),
            ParamValue::NonFinite(v) => write!(f, "{v}"),
            other => match other.to_json("") {
                Ok(json) => write!(f, "{json}"),
                Err(_) => write!(f, "<unrepresentable>"),
            },
        }
    }
}

/// Convert a JSON document into parameters. Only objects qualify.
pub(crate) fn parameters_from_json(value: serde_json::Value) -> Result<Parameters, String> {
    match value {
        serde_json::Value::Object(map) => {
            Ok(map.into_iter().map(|(k, v)| (k, ParamValue::from(v))).collect())
        }
        other => Err(format!("expected a JSON object, got {}", json_kind(&other))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ParamValue::Null,
            serde_json::Value::Bool(b) => ParamValue::Bool(b),
            serde_json::Value::Number(n) => ParamValue::Number(n),
            serde_json::Value::String(s) => ParamValue::String(s),
            serde_json::Value::Array(items) => {
                ParamValue::Array(items.into_iter().map(ParamValue::from).collect())
            }
            serde_json::Value::Object(map) => {
                ParamValue::Object(map.into_iter().map(|(k, v)| (k, ParamValue::from(v))).collect())
            }
        }
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::Number(Number::from(value))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(ParamValue::NonFinite(value), ParamValue::Number)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::from(f64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<Bytes> for ParamValue {
    fn from(value: Bytes) -> Self {
        ParamValue::Binary(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(value: Vec<T>) -> Self {
        ParamValue::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, ParamValue>> for ParamValue {
    fn from(value: BTreeMap<String, ParamValue>) -> Self {
        ParamValue::Object(value)
    }
}

/// Build a `Parameters` (or `Queries`) map.
///
/// ```
/// use courier_core::params;
///
/// let p = params! { "title" => "foo", "userId" => 1, "draft" => false };
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Parameters::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Parameters::new();
        $(
            map.insert(::std::string::String::from($key), $crate::ParamValue::from($value));
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_builds_sorted_map() {
        let p = params! { "b" => 2, "a" => "x", "c" => true };
        let keys: Vec<&str> = p.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(p["b"], ParamValue::Number(2.into()));
    }

    #[test]
    fn non_finite_float_is_not_coerced() {
        assert!(matches!(ParamValue::from(f64::NAN), ParamValue::NonFinite(_)));
        assert!(matches!(ParamValue::from(1.5), ParamValue::Number(_)));
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(ParamValue::from(None::<i32>), ParamValue::Null);
        assert_eq!(ParamValue::from(Some("x")), ParamValue::String("x".to_string()));
    }

    #[test]
    fn nested_binary_is_unrepresentable() {
        let value = ParamValue::from(params! {
            "inner" => vec![ParamValue::from(1), ParamValue::from(Bytes::from_static(b"\x00"))],
        });
        assert_eq!(value.to_json("outer").unwrap_err(), "outer[inner][1]");
    }

    #[test]
    fn json_object_converts_to_parameters() {
        let params = parameters_from_json(serde_json::json!({"id": 1, "tags": ["a"]})).unwrap();
        assert_eq!(params["id"], ParamValue::from(1));
        assert_eq!(params["tags"], ParamValue::from(vec!["a"]));
    }

    #[test]
    fn json_string_is_rejected() {
        let err = parameters_from_json(serde_json::json!("Invalid data")).unwrap_err();
        assert_eq!(err, "expected a JSON object, got a string");
    }

    #[test]
    fn display_describes_binary() {
        assert_eq!(ParamValue::from(Bytes::from_static(b"abc")).to_string(), "<binary: 3 bytes>");
        assert_eq!(ParamValue::from("x").to_string(), "\"x\"");
    }
}
