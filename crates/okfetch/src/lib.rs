//! Exception-free HTTP fetching.
//!
//! Every fallible operation returns a [`Result`] instead of panicking: the
//! fetch itself, and each single-shot read of the response body.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Plain request and response types
//! - [`core`] - Pure body decoding
//! - [`effects`] - Transports, the [`Fetcher`] and [`FetcherResponse`]
//!
//! # Example
//!
//! ```
//! use okfetch::Fetcher;
//! use okfetch::mock::{MockResponse, MockTransport};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let transport = MockTransport::new()
//!     .respond("https://api.test/hello", MockResponse::ok().with_body("hi"));
//! let fetcher = Fetcher::new(transport);
//!
//! match fetcher.get("https://api.test/hello").await {
//!     Ok(response) => assert_eq!(response.text().await.unwrap(), "hi"),
//!     Err(error) => panic!("transport failed: {error}"),
//! }
//! # }
//! ```

pub mod core;
pub mod data;
pub mod effects;
mod error;
pub mod result;

pub use data::{Blob, FormData, Headers, Method, RequestOptions, ResponseType};
pub use effects::{BoxStream, Fetcher, FetcherResponse, RawResponse, Transport, mock};
pub use error::Error;
pub use result::{
    Result, attempt, attempt_async, failure, is_failure, is_success, success, with_async_result, with_result,
};

#[cfg(feature = "reqwest")]
pub use effects::{ReqwestResponse, ReqwestTransport};

pub use tokio_util::sync::CancellationToken;
