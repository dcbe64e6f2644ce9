//! # Enlist (User Registration)
//!
//! `enlist` accepts new user registrations over HTTP and persists them in a
//! local `SQLite` database.
//!
//! ## Registration flow
//!
//! `POST /register` takes `{username, email, password}` and walks three steps:
//!
//! 1. **Presence:** every field must be present and non-empty.
//! 2. **Uniqueness:** no existing user may share the username or the email.
//! 3. **Persist:** the password is hashed with `bcrypt` and the row inserted.
//!
//! The `UNIQUE` constraints on `users.username` and `users.email` are the final
//! integrity guard; a concurrent registration that loses the race is rejected with
//! the same "already registered" answer as a sequential duplicate.
//!
//! ## Storage
//!
//! The store is reached through the [`store::UserStore`] trait. The binary wires a
//! [`store::SqliteStore`] at startup and injects it into the router, so handlers never
//! touch a global connection.

pub mod api;
pub mod cli;
pub mod client;
pub mod registration;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
