//! Error kind shared by every failure in okfetch.

use std::any::Any;
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The single failure kind produced by okfetch.
///
/// Every failure carries a human-readable message. When the failure was
/// converted from another error, that error is kept as the [`source`].
///
/// [`source`]: std::error::Error::source
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    message: String,
    #[source]
    source:  Option<BoxError>,
}

impl Error {
    /// Create an error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source:  None,
        }
    }

    /// Create an error with a message and an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source:  Some(Box::new(source)),
        }
    }

    /// Wrap a foreign error, using its `Display` output as the message.
    pub fn wrap(source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            message: source.to_string(),
            source:  Some(Box::new(source)),
        }
    }

    /// Normalize a panic payload.
    ///
    /// An `Error` payload passes through unchanged, string payloads become the
    /// message.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<Error>() {
            Ok(error) => return *error,
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<String>() {
            Ok(message) => return Self::new(*message),
            Err(payload) => payload,
        };
        match payload.downcast::<&'static str>() {
            Ok(message) => Self::new(*message),
            Err(_) => Self::new("opaque panic payload"),
        }
    }

    pub fn message(&self) -> &str { &self.message }

    /// Replace the message, keeping the previous error as the cause.
    pub fn context(self, message: impl Into<String>) -> Self { Self::with_source(message, self) }
}

impl From<String> for Error {
    fn from(message: String) -> Self { Self::new(message) }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self { Self::new(message) }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self { Self::wrap(e) }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self { Self::wrap(e) }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(e: std::string::FromUtf8Error) -> Self { Self::wrap(e) }
}

impl From<std::str::Utf8Error> for Error {
    fn from(e: std::str::Utf8Error) -> Self { Self::wrap(e) }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self { Self::wrap(e) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_message() {
        let error = Error::new("body stream already read");
        assert_eq!(error.to_string(), "body stream already read");
        assert!(error.source().is_none());
    }

    #[test]
    fn test_wrap_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = Error::from(io);
        assert_eq!(error.message(), "refused");
        assert!(error.source().is_some());
    }

    #[test]
    fn test_context_chains_previous_error() {
        let error = Error::new("connection reset").context("Unable to fetch users");
        assert_eq!(error.message(), "Unable to fetch users");
        assert_eq!(error.source().map(|s| s.to_string()).as_deref(), Some("connection reset"));
    }

    #[test]
    fn test_from_panic_payloads() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("boom"));
        assert_eq!(Error::from_panic(owned).message(), "boom");

        let borrowed: Box<dyn Any + Send> = Box::new("static boom");
        assert_eq!(Error::from_panic(borrowed).message(), "static boom");

        let error: Box<dyn Any + Send> = Box::new(Error::new("already an error"));
        assert_eq!(Error::from_panic(error).message(), "already an error");

        let opaque: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(Error::from_panic(opaque).message(), "opaque panic payload");
    }
}
