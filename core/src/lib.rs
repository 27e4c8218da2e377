//! Declarative HTTP request construction and response decoding.
//!
//! # Overview
//! Describe a request with `RequestBuilder` (or an API enum implementing
//! `Target`), compile it into a plain-data `HttpRequest`, hand it to a
//! caller-supplied `Transport`, and decode the answer into bytes, text, JSON
//! or any `serde` type. The crate itself never opens a socket.
//!
//! # Design
//! - Builders record the first error they hit and report it at compile time,
//!   so fluent chains never need `?` in the middle.
//! - Query and body values are a closed `ParamValue` set; values without a
//!   wire form produce typed errors rather than being dropped.
//! - The body encoder is chosen by one function from the `Content-Type`
//!   header and body kind (`encoding::resolve_body_encoding`).
//! - Every failure is a variant of `Error`; transport errors are wrapped in
//!   `Error::NetworkFailure`.
//! - No retry, caching or pooling; compose those around a `Transport`.

pub mod client;
pub mod config;
pub mod encoding;
pub mod error;
pub mod http;
pub mod params;
pub mod provider;
pub mod request;
pub mod response;
pub mod target;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{BoxError, Error, Result, SharedCause};
pub use http::{Header, Headers, HttpMethod, HttpRequest, HttpResponse};
pub use params::{ParamValue, Parameters, Queries};
pub use provider::Provider;
pub use request::RequestBuilder;
pub use response::{DataResponse, ErrorDecoder, ResponseMeta, SharedErrorDecoder};
pub use target::{EncodedValue, Target, Task};
pub use transport::Transport;
