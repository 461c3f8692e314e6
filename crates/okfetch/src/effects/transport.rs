use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::data::{Headers, RequestOptions, ResponseType};
use crate::error::Error;

/// A boxed stream type for response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// The low-level request primitive a [`Fetcher`](crate::Fetcher) delegates to.
///
/// Implementations are free to fail in any way they like, including by
/// panicking; the fetcher normalizes every failure into an [`Error`].
/// Redirects, timeouts, pooling and retries are the transport's concern.
///
/// # Implementations
///
/// - [`ReqwestTransport`](crate::ReqwestTransport): production transport using `reqwest`
/// - [`MockTransport`](crate::mock::MockTransport): canned responses for tests
pub trait Transport: Send + Sync {
    type Response: RawResponse;

    type Error: Into<Error> + Send + 'static;

    /// Perform one request.
    ///
    /// Non-2xx statuses are successful responses at this level.
    fn request(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send;
}

/// One response as produced by a [`Transport`].
///
/// Metadata accessors must reflect the current state on every call. The body
/// is single-use: after [`bytes`](Self::bytes) or [`body`](Self::body) has
/// taken it, [`body_used`](Self::body_used) returns `true` and further reads
/// fail.
pub trait RawResponse: Send + Sync + Sized {
    type Error: Into<Error> + Send + 'static;

    fn status(&self) -> u16;

    fn status_text(&self) -> String;

    fn headers(&self) -> Headers;

    fn url(&self) -> String;

    fn redirected(&self) -> bool;

    fn response_type(&self) -> ResponseType;

    fn body_used(&self) -> bool;

    /// Whether the status is in the `200..=299` range.
    fn ok(&self) -> bool { (200..=299).contains(&self.status()) }

    /// Take the body as a byte stream.
    ///
    /// Returns `None` when the response has no body or it was already taken.
    fn body(&self) -> Option<BoxStream<'static, Result<Bytes, Error>>>;

    /// Read the whole body.
    fn bytes(&self) -> impl Future<Output = Result<Bytes, Self::Error>> + Send;

    /// Duplicate the response so the body can be read once more.
    ///
    /// Fails once the body has been used.
    fn try_clone(&self) -> Result<Self, Self::Error>;
}
