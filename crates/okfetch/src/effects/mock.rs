//! In-memory transport for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use futures_util::stream;
use serde::Serialize;

use crate::data::{Headers, Method, RequestOptions, ResponseType};
use crate::effects::transport::{BoxStream, RawResponse, Transport};
use crate::error::Error;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> { mutex.lock().unwrap_or_else(PoisonError::into_inner) }

#[derive(Debug, Clone)]
struct Meta {
    status:        u16,
    status_text:   String,
    headers:       Headers,
    url:           String,
    redirected:    bool,
    response_type: ResponseType,
}

/// Canned response with mutable metadata.
///
/// The setters take `&self` so a test can change a response after it has
/// been wrapped and observe the change through the wrapper.
#[derive(Debug)]
pub struct MockResponse {
    meta:       Mutex<Meta>,
    body:       Option<Bytes>,
    body_error: Option<String>,
    used:       AtomicBool,
}

impl MockResponse {
    /// Create an empty-bodied response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            meta:       Mutex::new(Meta {
                status,
                status_text: String::new(),
                headers: Headers::new(),
                url: String::new(),
                redirected: false,
                response_type: ResponseType::Basic,
            }),
            body:       None,
            body_error: None,
            used:       AtomicBool::new(false),
        }
    }

    pub fn ok() -> Self { Self::new(200).with_status_text("OK") }

    #[must_use]
    pub fn with_status_text(self, text: impl Into<String>) -> Self {
        lock(&self.meta).status_text = text.into();
        self
    }

    #[must_use]
    pub fn with_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        lock(&self.meta).headers.append(name, value);
        self
    }

    #[must_use]
    pub fn with_url(self, url: impl Into<String>) -> Self {
        lock(&self.meta).url = url.into();
        self
    }

    #[must_use]
    pub fn with_redirected(self, redirected: bool) -> Self {
        lock(&self.meta).redirected = redirected;
        self
    }

    #[must_use]
    pub fn with_response_type(self, response_type: ResponseType) -> Self {
        lock(&self.meta).response_type = response_type;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a JSON body and content type.
    ///
    /// If `value` cannot be serialized, body reads fail with the serializer's
    /// message.
    #[must_use]
    pub fn with_json<T: Serialize>(self, value: &T) -> Self {
        let response = self.with_header("Content-Type", "application/json");
        match serde_json::to_vec(value) {
            Ok(body) => response.with_body(body),
            Err(e) => response.with_body(Bytes::new()).with_body_error(e.to_string()),
        }
    }

    /// Make every body read fail with `message`.
    #[must_use]
    pub fn with_body_error(mut self, message: impl Into<String>) -> Self {
        self.body_error = Some(message.into());
        self
    }

    pub fn set_status(&self, status: u16) { lock(&self.meta).status = status; }

    pub fn set_header(&self, name: &str, value: &str) { lock(&self.meta).headers.set(name, value); }

    pub fn set_url(&self, url: &str) { lock(&self.meta).url = url.to_owned(); }

    /// Copy with a fresh, unread body.
    fn fresh(&self) -> Self {
        Self {
            meta:       Mutex::new(lock(&self.meta).clone()),
            body:       self.body.clone(),
            body_error: self.body_error.clone(),
            used:       AtomicBool::new(false),
        }
    }
}

impl RawResponse for MockResponse {
    type Error = Error;

    fn status(&self) -> u16 { lock(&self.meta).status }

    fn status_text(&self) -> String { lock(&self.meta).status_text.clone() }

    fn headers(&self) -> Headers { lock(&self.meta).headers.clone() }

    fn url(&self) -> String { lock(&self.meta).url.clone() }

    fn redirected(&self) -> bool { lock(&self.meta).redirected }

    fn response_type(&self) -> ResponseType { lock(&self.meta).response_type }

    fn body_used(&self) -> bool { self.used.load(Ordering::SeqCst) }

    fn body(&self) -> Option<BoxStream<'static, Result<Bytes, Error>>> {
        let body = self.body.clone()?;
        if self.used.swap(true, Ordering::SeqCst) {
            return None;
        }
        let chunk = match &self.body_error {
            Some(message) => Err(Error::new(message.clone())),
            None => Ok(body),
        };
        Some(Box::pin(stream::iter([chunk])))
    }

    async fn bytes(&self) -> Result<Bytes, Error> {
        if self.used.swap(true, Ordering::SeqCst) {
            return Err(Error::new("body stream already read"));
        }
        if let Some(message) = &self.body_error {
            return Err(Error::new(message.clone()));
        }
        Ok(self.body.clone().unwrap_or_default())
    }

    fn try_clone(&self) -> Result<Self, Error> {
        if self.body_used() {
            return Err(Error::new("Response.clone: Body has already been consumed."));
        }
        Ok(self.fresh())
    }
}

/// A request as seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url:     String,
    pub method:  Method,
    pub headers: Headers,
    pub body:    Option<Bytes>,
}

#[derive(Debug)]
enum Route {
    Respond(MockResponse),
    Fail(String),
    Panic(String),
}

/// Transport answering from a fixed route table.
///
/// Unknown URLs fail like an unreachable host would.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes:   HashMap<String, Route>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self { Self::default() }

    /// Answer `url` with a fresh copy of `response` on every request.
    #[must_use]
    pub fn respond(mut self, url: impl Into<String>, response: MockResponse) -> Self {
        let url = url.into();
        let response = if lock(&response.meta).url.is_empty() {
            response.with_url(url.clone())
        } else {
            response
        };
        self.routes.insert(url, Route::Respond(response));
        self
    }

    /// Fail requests to `url` with `message`.
    #[must_use]
    pub fn fail(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.routes.insert(url.into(), Route::Fail(message.into()));
        self
    }

    /// Panic while serving requests to `url`.
    #[must_use]
    pub fn panic(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.routes.insert(url.into(), Route::Panic(message.into()));
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> { lock(&self.requests).clone() }
}

impl Transport for MockTransport {
    type Response = MockResponse;
    type Error = Error;

    async fn request(&self, url: &str, options: RequestOptions) -> Result<MockResponse, Error> {
        lock(&self.requests).push(RecordedRequest {
            url:     url.to_owned(),
            method:  options.method,
            headers: options.headers,
            body:    options.body,
        });

        if options.signal.as_ref().is_some_and(|signal| signal.is_cancelled()) {
            return Err(Error::new("The operation was aborted."));
        }

        match self.routes.get(url) {
            Some(Route::Respond(response)) => Ok(response.fresh()),
            Some(Route::Fail(message)) => Err(Error::new(message.clone())),
            Some(Route::Panic(message)) => panic!("{message}"),
            None => Err(Error::new(format!("error sending request for url ({url})"))),
        }
    }
}
