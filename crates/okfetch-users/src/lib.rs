//! User repository over an okfetch [`Fetcher`](okfetch::Fetcher).

mod repository;
mod user;

pub use repository::{FETCH_USER_BY_ID_FAILED, FETCH_USERS_FAILED, HttpUserRepository, UserRepository};
pub use user::{User, UserId};
