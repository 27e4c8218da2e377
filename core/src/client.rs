//! Executes request builders through a transport and decodes the result.
//!
//! # Design
//! `Client` holds only a transport and an immutable `ClientConfig`. Every call
//! runs the same sequence: compile the builder (no transport call when that
//! fails), send, validate, decode. The four `request_*` methods differ only in
//! the decoding step.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::request::RequestBuilder;
use crate::response::{self, DataResponse, ResponseMeta};
use crate::transport::Transport;

/// Runs requests against a `Transport`.
#[derive(Debug, Clone)]
pub struct Client<T> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Compile, send and validate; returns the metadata and raw body.
    async fn execute(&self, builder: &RequestBuilder) -> Result<(ResponseMeta, Bytes)> {
        let mut request = builder.compile()?;
        request.headers = self.config.apply_defaults(request.headers);

        let request_id = request.id;
        debug!(%request_id, method = %request.method, url = %request.url, "sending request");

        let response = self.transport.send(request).await.map_err(|err| {
            warn!(%request_id, error = %err, "transport failed");
            Error::network(err)
        })?;
        let (meta, data) = response::split(response);
        debug!(%request_id, status = meta.status, bytes = data.len(), "received response");

        let acceptable = builder
            .acceptable_status()
            .unwrap_or(&self.config.acceptable_status);
        response::validate(&meta, &data, acceptable, builder.error_decoder())?;
        Ok((meta, data))
    }

    /// The body as raw bytes.
    ///
    /// # Errors
    /// Builder errors, `NetworkFailure`, `InvalidResponse`,
    /// `InvalidStatusCode` or `Custom`.
    pub async fn request_raw(&self, builder: &RequestBuilder) -> Result<DataResponse<Bytes>> {
        let (meta, data) = self.execute(builder).await?;
        Ok(DataResponse::new(data.clone(), data, meta))
    }

    /// The body as UTF-8 text.
    pub async fn request_string(&self, builder: &RequestBuilder) -> Result<DataResponse<String>> {
        let (meta, data) = self.execute(builder).await?;
        let text = response::decode_string(&data)?;
        Ok(DataResponse::new(text, data, meta))
    }

    /// The body as an untyped JSON value.
    pub async fn request_json(&self, builder: &RequestBuilder) -> Result<DataResponse<serde_json::Value>> {
        let (meta, data) = self.execute(builder).await?;
        let json = response::decode_json(&data)?;
        Ok(DataResponse::new(json, data, meta))
    }

    /// The body decoded into `D`.
    pub async fn request_decodable<D: DeserializeOwned>(
        &self,
        builder: &RequestBuilder,
    ) -> Result<DataResponse<D>> {
        let (meta, data) = self.execute(builder).await?;
        let value = response::decode_decodable(&data)?;
        Ok(DataResponse::new(value, data, meta))
    }
}
