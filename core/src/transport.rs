//! The single I/O seam of the crate.
//!
//! A `Transport` takes a compiled `HttpRequest` and returns the raw
//! `HttpResponse`. Connection handling, TLS, timeouts and redirects are the
//! transport's business; any error it returns is surfaced to callers as
//! `Error::NetworkFailure`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes HTTP requests on behalf of the pipeline.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the complete response.
    ///
    /// Non-2xx statuses are responses, not errors; only failures to obtain a
    /// response at all (including cancellation) should be returned as `Err`.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        (**self).send(request).await
    }
}
