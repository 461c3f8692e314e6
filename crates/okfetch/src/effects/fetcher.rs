use std::panic::{self, AssertUnwindSafe};

use crate::data::RequestOptions;
use crate::effects::response::FetcherResponse;
use crate::effects::transport::{RawResponse, Transport};
use crate::error::Error;
use crate::result::{Result, attempt_async, failure, success};

/// Result-typed front end over a [`Transport`].
///
/// A fetch fails only when the transport does (network failure, invalid URL,
/// abort, panic). A response with any status code, 404 and 500 included, is a
/// success; inspect [`FetcherResponse::ok`] or [`FetcherResponse::status`].
pub struct Fetcher<T: Transport> {
    transport: T,
}

impl<T: Transport> Fetcher<T> {
    /// Create a fetcher over the provided transport.
    pub fn new(transport: T) -> Self { Self { transport } }

    /// Fetch `url` with default options.
    pub async fn get(&self, url: &str) -> Result<FetcherResponse<T::Response>> {
        self.fetch(url, RequestOptions::default()).await
    }

    /// Perform one request through the transport.
    pub async fn fetch(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<FetcherResponse<T::Response>> {
        tracing::debug!(%url, method = %options.method, "dispatching request");

        let pending = match panic::catch_unwind(AssertUnwindSafe(|| self.transport.request(url, options))) {
            Ok(pending) => pending,
            Err(payload) => return self.transport_failure(url, Error::from_panic(payload)),
        };

        match attempt_async(pending).await {
            Ok(raw) => {
                tracing::debug!(%url, status = raw.status(), "received response");
                success(FetcherResponse::new(raw))
            }
            Err(error) => self.transport_failure(url, error),
        }
    }

    pub fn transport(&self) -> &T { &self.transport }

    fn transport_failure(&self, url: &str, error: Error) -> Result<FetcherResponse<T::Response>> {
        tracing::warn!(%url, %error, "transport failed");
        failure(error)
    }
}

impl<T: Transport + Clone> Clone for Fetcher<T> {
    fn clone(&self) -> Self { Self::new(self.transport.clone()) }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for Fetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher").field("transport", &self.transport).finish()
    }
}

#[cfg(feature = "reqwest")]
impl Default for Fetcher<crate::effects::ReqwestTransport> {
    fn default() -> Self { Self::new(crate::effects::ReqwestTransport::default()) }
}
