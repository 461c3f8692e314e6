use std::future::Future;

use okfetch::{Fetcher, Result, Transport};

use crate::user::{User, UserId};

pub const FETCH_USERS_FAILED: &str = "Unable to fetch users";
pub const FETCH_USER_BY_ID_FAILED: &str = "Unable to fetch user by ID";

/// Read access to users.
pub trait UserRepository: Send + Sync {
    fn get_all(&self) -> impl Future<Output = Result<Vec<User>>> + Send;

    fn get_by_id(&self, id: UserId) -> impl Future<Output = Result<User>> + Send;
}

/// [`UserRepository`] backed by `GET {host}/users` and `GET {host}/users/{id}`.
///
/// Any failure, whether the request or the decoding of its body, is reported
/// with a fixed message; the underlying error stays reachable through
/// [`std::error::Error::source`].
pub struct HttpUserRepository<T: Transport> {
    host:    String,
    fetcher: Fetcher<T>,
}

impl<T: Transport> HttpUserRepository<T> {
    pub fn with_fetcher(host: impl Into<String>, fetcher: Fetcher<T>) -> Self {
        let host = host.into().trim_end_matches('/').to_owned();
        Self { host, fetcher }
    }

    pub fn host(&self) -> &str { &self.host }

    pub fn fetcher(&self) -> &Fetcher<T> { &self.fetcher }
}

#[cfg(feature = "reqwest")]
impl HttpUserRepository<okfetch::ReqwestTransport> {
    /// Repository using the default `reqwest` transport.
    pub fn new(host: impl Into<String>) -> Self { Self::with_fetcher(host, Fetcher::default()) }
}

impl<T: Transport> UserRepository for HttpUserRepository<T> {
    async fn get_all(&self) -> Result<Vec<User>> {
        let url = format!("{}/users", self.host);
        let response = self.fetcher.get(&url).await.map_err(|e| e.context(FETCH_USERS_FAILED))?;
        let users: Vec<User> = response.json().await.map_err(|e| e.context(FETCH_USERS_FAILED))?;
        tracing::debug!(count = users.len(), "fetched users");
        Ok(users)
    }

    async fn get_by_id(&self, id: UserId) -> Result<User> {
        let url = format!("{}/users/{id}", self.host);
        let response = self.fetcher.get(&url).await.map_err(|e| e.context(FETCH_USER_BY_ID_FAILED))?;
        response.json().await.map_err(|e| e.context(FETCH_USER_BY_ID_FAILED))
    }
}
