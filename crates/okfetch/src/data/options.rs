use std::fmt;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use super::headers::Headers;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl std::str::FromStr for Method {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            other => Err(crate::Error::new(format!("unsupported HTTP method: {other}"))),
        }
    }
}

/// Per-request options handed through to the transport untouched.
///
/// # Examples
///
/// ```
/// use okfetch::{Method, RequestOptions};
///
/// let options = RequestOptions::default()
///     .method(Method::Post)
///     .header("Content-Type", "application/json")
///     .body(r#"{"name":"Ada"}"#);
/// assert_eq!(options.method, Method::Post);
/// ```
#[derive(Clone, Default)]
pub struct RequestOptions {
    /// Default: `GET`
    pub method: Method,

    /// Headers sent with the request.
    pub headers: Headers,

    /// Request payload, if any.
    pub body: Option<Bytes>,

    /// Cancellation signal.
    ///
    /// Only transports that observe it can abort; the resulting failure is
    /// normalized like any other transport failure.
    pub signal: Option<CancellationToken>,
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(Bytes::len))
            .field("signal", &self.signal.as_ref().map(CancellationToken::is_cancelled))
            .finish()
    }
}

impl RequestOptions {
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Append a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replace all headers.
    #[must_use]
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }
}
