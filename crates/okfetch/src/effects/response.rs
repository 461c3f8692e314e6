use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::core;
use crate::data::{Blob, FormData, Headers, ResponseType};
use crate::effects::transport::{BoxStream, RawResponse};
use crate::error::Error;
use crate::result::{Result, attempt, attempt_async};

/// Exception-free view over one transport response.
///
/// Metadata accessors query the wrapped response on every call, so they
/// always reflect its current state. Body operations are single-shot: once
/// one of them has run, [`body_used`](Self::body_used) is `true` and any
/// further read yields a failure.
#[derive(Debug)]
pub struct FetcherResponse<R: RawResponse> {
    raw: R,
}

impl<R: RawResponse> FetcherResponse<R> {
    pub fn new(raw: R) -> Self { Self { raw } }

    pub fn body(&self) -> Option<BoxStream<'static, Result<Bytes>>> { self.raw.body() }

    pub fn body_used(&self) -> bool { self.raw.body_used() }

    pub fn headers(&self) -> Headers { self.raw.headers() }

    pub fn ok(&self) -> bool { self.raw.ok() }

    pub fn redirected(&self) -> bool { self.raw.redirected() }

    pub fn status(&self) -> u16 { self.raw.status() }

    pub fn status_text(&self) -> String { self.raw.status_text() }

    pub fn response_type(&self) -> ResponseType { self.raw.response_type() }

    pub fn url(&self) -> String { self.raw.url() }

    /// Read the body as raw bytes.
    pub async fn array_buffer(&self) -> Result<Bytes> {
        tracing::trace!(url = %self.raw.url(), "reading response body");
        attempt_async(self.raw.bytes()).await
    }

    pub async fn blob(&self) -> Result<Blob> {
        let bytes = self.array_buffer().await?;
        Ok(core::decode_blob(bytes, &self.raw.headers()))
    }

    /// Read an `application/x-www-form-urlencoded` body.
    pub async fn form_data(&self) -> Result<FormData> {
        let bytes = self.array_buffer().await?;
        core::decode_form_data(&bytes, &self.raw.headers())
    }

    pub async fn text(&self) -> Result<String> {
        let bytes = self.array_buffer().await?;
        core::decode_text(&bytes)
    }

    /// Read a JSON body into `D`.
    ///
    /// The payload is validated by `D`'s `Deserialize` impl; a body of the
    /// wrong shape is a failure, never a mistyped success. Use
    /// [`json_value`](Self::json_value) to skip validation.
    pub async fn json<D: DeserializeOwned>(&self) -> Result<D> {
        let bytes = self.array_buffer().await?;
        core::decode_json(&bytes)
    }

    /// Read a JSON body as an untyped value.
    pub async fn json_value(&self) -> Result<serde_json::Value> {
        let bytes = self.array_buffer().await?;
        core::decode_json_value(&bytes)
    }

    /// Wrap a duplicate of the underlying response.
    ///
    /// The sibling has its own, unread body.
    pub fn try_clone(&self) -> Result<Self> {
        attempt(|| self.raw.try_clone()).map(Self::new)
    }

    /// Turn a non-2xx status into a failure.
    ///
    /// Fetching itself never does this; callers opt in.
    pub fn error_for_status(self) -> Result<Self> {
        if self.ok() {
            return Ok(self);
        }
        let line = format!("HTTP status {} {}", self.status(), self.status_text());
        Err(Error::new(line.trim_end()))
    }
}

impl<R: RawResponse> From<R> for FetcherResponse<R> {
    fn from(raw: R) -> Self { Self::new(raw) }
}

impl<R: RawResponse> AsRef<R> for FetcherResponse<R> {
    fn as_ref(&self) -> &R { &self.raw }
}
