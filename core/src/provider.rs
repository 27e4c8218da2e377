//! Generic executor for one `Target` type.

use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::request::RequestBuilder;
use crate::response::{DataResponse, ErrorDecoder, SharedErrorDecoder};
use crate::target::{builder_for, Target};
use crate::transport::Transport;

/// Turns values of `T` into requests and runs them.
///
/// The provider keeps no state between calls: each call evaluates the target
/// again and builds a fresh request.
pub struct Provider<T, Tr> {
    client: Client<Tr>,
    error_decoder: Option<SharedErrorDecoder>,
    _target: PhantomData<fn(T)>,
}

impl<T: Target, Tr: Transport> Provider<T, Tr> {
    pub fn new(transport: Tr) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: Tr, config: ClientConfig) -> Self {
        Self {
            client: Client::with_config(transport, config),
            error_decoder: None,
            _target: PhantomData,
        }
    }

    /// Decode bodies of rejected responses with `decoder` for every target.
    pub fn with_error_decoder<D: ErrorDecoder>(mut self, decoder: D) -> Self {
        self.error_decoder = Some(SharedErrorDecoder::new(decoder));
        self
    }

    pub fn client(&self) -> &Client<Tr> {
        &self.client
    }

    /// The builder a call for `target` would send, with default validation.
    pub fn build_request(&self, target: &T) -> RequestBuilder {
        builder_for(target)
            .validate()
            .shared_error_decoder(self.error_decoder.clone())
    }

    /// # Errors
    /// Any error of `Client::request_raw`.
    pub async fn request(&self, target: T) -> Result<DataResponse<Bytes>> {
        self.client.request_raw(&self.build_request(&target)).await
    }

    pub async fn request_string(&self, target: T) -> Result<DataResponse<String>> {
        self.client.request_string(&self.build_request(&target)).await
    }

    pub async fn request_json(&self, target: T) -> Result<DataResponse<serde_json::Value>> {
        self.client.request_json(&self.build_request(&target)).await
    }

    pub async fn request_decodable<D: DeserializeOwned>(&self, target: T) -> Result<DataResponse<D>> {
        self.client.request_decodable(&self.build_request(&target)).await
    }
}
