//! Plain data types exchanged with transports and callers.

pub mod body;
pub mod headers;
pub mod options;

pub use body::{Blob, FormData, ResponseType};
pub use headers::Headers;
pub use options::{Method, RequestOptions};
