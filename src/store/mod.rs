//! Store-access interface for user records.
//!
//! The registration flow only needs three operations, so the trait stays small.
//! [`SqliteStore`] is the production implementation.

mod sqlite;

pub use self::sqlite::SqliteStore;

#[cfg(test)]
pub(crate) use self::sqlite::test_support as sqlite_test_support;

use async_trait::async_trait;
use thiserror::Error;

/// Schema applied on startup; idempotent.
pub const USERS_SCHEMA_SQL: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/db/sql/users.sql"));

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to apply schema")]
    Schema(#[source] sqlx::Error),
    #[error("failed to connect to database")]
    Connect(#[source] sqlx::Error),
    #[error("query failed")]
    Query(#[source] sqlx::Error),
}

/// Row ready to be inserted. `password_hash` must already be a one-way hash.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Persisted user record.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

/// Outcome of an insert guarded by the table's unique constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(i64),
    Conflict,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Round-trip to the backing database.
    async fn ping(&self) -> Result<(), StoreError>;

    /// True when any user already holds `username` or `email`.
    async fn is_registered(&self, username: &str, email: &str) -> Result<bool, StoreError>;

    /// Insert a user. Unique-constraint violations are reported as
    /// [`InsertOutcome::Conflict`], not as errors.
    async fn insert(&self, user: &NewUser) -> Result<InsertOutcome, StoreError>;
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
