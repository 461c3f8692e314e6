//! I/O: transports, the fetcher and the response wrapper.
//!
//! Every failure crossing this layer is normalized through the adapters in
//! [`crate::result`].

mod fetcher;
pub mod mock;
mod response;
mod transport;

#[cfg(feature = "reqwest")]
mod reqwest_transport;

pub use fetcher::Fetcher;
pub use response::FetcherResponse;
pub use transport::{BoxStream, RawResponse, Transport};

#[cfg(feature = "reqwest")]
pub use reqwest_transport::{ReqwestResponse, ReqwestTransport};
