//! Declarative endpoint descriptions.
//!
//! # Design
//! An API is described by an enum with one variant per endpoint that
//! implements `Target`. Each accessor is a pure function of the variant, so a
//! `Provider` can evaluate a target any number of times and always get the
//! same request.

use bytes::Bytes;
use serde::Serialize;

use crate::http::{Headers, HttpMethod};
use crate::params::{Parameters, Queries};
use crate::request::RequestBuilder;

/// How the body of a target's request is produced.
#[derive(Debug, Clone)]
pub enum Task {
    /// No body.
    Plain,
    /// Bytes sent verbatim.
    RawData(Bytes),
    /// A serializable value sent as JSON.
    Encodable(EncodedValue),
    /// A parameter map, encoded according to the `Content-Type` header.
    Parameters(Parameters),
}

impl Task {
    /// Serialize `value` for use as a JSON body.
    ///
    /// A serialization failure is kept and reported as
    /// `Error::ParameterEncodingFailure` when the request is compiled.
    pub fn encodable<T: Serialize + ?Sized>(value: &T) -> Self {
        Task::Encodable(EncodedValue(
            serde_json::to_value(value).map_err(|e| e.to_string()),
        ))
    }

    fn apply(self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Task::Plain => builder,
            Task::RawData(bytes) => builder.body(bytes),
            Task::Encodable(EncodedValue(encoded)) => builder.encoded(encoded),
            Task::Parameters(parameters) => builder.add_parameters(parameters),
        }
    }
}

/// A value already serialized to a JSON document, or the reason it could not
/// be.
#[derive(Debug, Clone)]
pub struct EncodedValue(Result<serde_json::Value, String>);

/// One endpoint of an API.
pub trait Target {
    fn base_url(&self) -> String;

    fn path(&self) -> String;

    fn method(&self) -> HttpMethod;

    fn queries(&self) -> Option<Queries> {
        None
    }

    fn headers(&self) -> Option<Headers> {
        None
    }

    fn task(&self) -> Task;

    /// `base_url` and `path` joined by exactly one `/`.
    fn url(&self) -> String {
        join_url(&self.base_url(), &self.path())
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{}/{path}", base.trim_end_matches('/'))
}

/// Evaluate `target` once and turn it into a builder.
pub(crate) fn builder_for<T: Target + ?Sized>(target: &T) -> RequestBuilder {
    let mut builder = RequestBuilder::new(target.url()).method(target.method());
    if let Some(queries) = target.queries() {
        builder = builder.add_queries(queries);
    }
    if let Some(headers) = target.headers() {
        builder = builder.add_headers(headers);
    }
    target.task().apply(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::http::Header;
    use crate::params;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct NewPost {
        title: String,
        body: String,
        user_id: i64,
    }

    enum Api {
        GetPost { id: i64 },
        CreatePost(NewPost),
        Search { term: String },
        Upload(Bytes),
        Form,
    }

    impl Target for Api {
        fn base_url(&self) -> String {
            "https://jsonplaceholder.typicode.com/".to_string()
        }

        fn path(&self) -> String {
            match self {
                Api::GetPost { id } => format!("/posts/{id}"),
                Api::CreatePost(_) | Api::Form => "/posts".to_string(),
                Api::Search { .. } => "search".to_string(),
                Api::Upload(_) => "/upload".to_string(),
            }
        }

        fn method(&self) -> HttpMethod {
            match self {
                Api::GetPost { .. } | Api::Search { .. } => HttpMethod::Get,
                Api::CreatePost(_) | Api::Form => HttpMethod::Post,
                Api::Upload(_) => HttpMethod::Put,
            }
        }

        fn queries(&self) -> Option<Queries> {
            match self {
                Api::Search { term } => Some(params! { "q" => term.as_str() }),
                _ => None,
            }
        }

        fn headers(&self) -> Option<Headers> {
            match self {
                Api::Form => Some(Headers::from([Header::content_type(
                    "application/x-www-form-urlencoded",
                )])),
                _ => None,
            }
        }

        fn task(&self) -> Task {
            match self {
                Api::GetPost { .. } | Api::Search { .. } => Task::Plain,
                Api::CreatePost(post) => Task::encodable(post),
                Api::Upload(bytes) => Task::RawData(bytes.clone()),
                Api::Form => Task::Parameters(params! { "title" => "foo" }),
            }
        }
    }

    #[test]
    fn joins_url_with_single_slash() {
        assert_eq!(join_url("https://a.b/", "/posts"), "https://a.b/posts");
        assert_eq!(join_url("https://a.b", "posts"), "https://a.b/posts");
        assert_eq!(join_url("https://a.b/api", ""), "https://a.b/api");
    }

    #[test]
    fn plain_target() {
        let req = builder_for(&Api::GetPost { id: 1 }).compile().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://jsonplaceholder.typicode.com/posts/1");
        assert!(req.body.is_none());
        assert!(req.headers.content_type().is_none());
    }

    #[test]
    fn encodable_target_sets_json() {
        let post = NewPost {
            title: "t".to_string(),
            body: "b".to_string(),
            user_id: 1,
        };
        let req = builder_for(&Api::CreatePost(post)).compile().unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.headers.content_type(), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"title": "t", "body": "b", "userId": 1}));
    }

    #[test]
    fn query_target() {
        let req = builder_for(&Api::Search { term: "a b".to_string() }).compile().unwrap();
        assert_eq!(req.url, "https://jsonplaceholder.typicode.com/search?q=a+b");
    }

    #[test]
    fn raw_target() {
        let req = builder_for(&Api::Upload(Bytes::from_static(b"\x89PNG"))).compile().unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.body.as_deref(), Some(&b"\x89PNG"[..]));
        assert!(req.headers.content_type().is_none());
    }

    #[test]
    fn parameters_target_follows_content_type() {
        let req = builder_for(&Api::Form).compile().unwrap();
        assert_eq!(req.body.as_deref(), Some(&b"title=foo"[..]));
    }

    #[test]
    fn failed_encodable_surfaces_at_compile() {
        let task = Task::Encodable(EncodedValue(Err("boom".to_string())));
        let err = task.apply(RequestBuilder::new("https://a.b")).compile().unwrap_err();
        assert!(matches!(err, Error::ParameterEncodingFailure(ref reason) if reason == "boom"));
    }

    #[test]
    fn target_is_evaluated_fresh() {
        let target = Api::GetPost { id: 7 };
        let first = builder_for(&target);
        let second = builder_for(&target);
        assert_ne!(first.id(), second.id());
        assert_eq!(first.compile().unwrap().url, second.compile().unwrap().url);
    }
}
