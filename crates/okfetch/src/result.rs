//! Result factories and the adapters that turn panicking or fallible
//! functions into functions returning a [`Result`].
//!
//! Every failure funnels through the same normalization: an [`Error`] passes
//! through verbatim, any other error value is converted with `Into<Error>`, and
//! panic payloads are turned into an [`Error`] by [`Error::from_panic`].

use std::error::Error as StdError;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};

use crate::error::Error;

/// Outcome of a fallible operation: `Ok` is a success, `Err` a failure.
pub type Result<S, F = Error> = std::result::Result<S, F>;

#[inline]
pub fn success<S, F: StdError>(value: S) -> Result<S, F> { Ok(value) }

#[inline]
pub fn failure<S, F: StdError>(error: F) -> Result<S, F> { Err(error) }

#[inline]
pub fn is_success<S, F: StdError>(result: &Result<S, F>) -> bool { result.is_ok() }

#[inline]
pub fn is_failure<S, F: StdError>(result: &Result<S, F>) -> bool { result.is_err() }

/// Run `f` now, capturing both its error and any panic as a failure.
pub fn attempt<T, E, F>(f: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, E>,
    E: Into<Error>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => success(value),
        Ok(Err(error)) => failure(error.into()),
        Err(payload) => failure(Error::from_panic(payload)),
    }
}

/// Await `fut`, capturing both its error and any panic raised while polling.
///
/// The returned future never panics on account of `fut`.
pub async fn attempt_async<T, E, Fut>(fut: Fut) -> Result<T>
where
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Into<Error>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => success(value),
        Ok(Err(error)) => failure(error.into()),
        Err(payload) => failure(Error::from_panic(payload)),
    }
}

/// Adapt `f` so that it returns a [`Result`] instead of panicking.
///
/// Multiple arguments are passed as a tuple.
///
/// ```
/// use okfetch::{Error, with_result};
///
/// let parse = with_result(|s: &str| s.parse::<u32>().map_err(Error::wrap));
/// assert_eq!(parse("7").unwrap(), 7);
/// assert!(parse("seven").is_err());
/// ```
pub fn with_result<A, T, E, F>(f: F) -> impl Fn(A) -> Result<T>
where
    F: Fn(A) -> std::result::Result<T, E>,
    E: Into<Error>,
{
    move |args| attempt(|| f(args))
}

/// Adapt an async `f` so that its future always resolves to a [`Result`].
///
/// A panic while building the future is captured the same way as a panic
/// while polling it.
pub fn with_async_result<A, T, E, F, Fut>(f: F) -> impl Fn(A) -> BoxFuture<'static, Result<T>>
where
    F: Fn(A) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Into<Error> + Send + 'static,
{
    move |args| match panic::catch_unwind(AssertUnwindSafe(|| f(args))) {
        Ok(fut) => attempt_async(fut).boxed(),
        Err(payload) => future::ready(failure(Error::from_panic(payload))).boxed(),
    }
}
