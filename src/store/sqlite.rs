use super::{
    is_unique_violation, InsertOutcome, NewUser, StoreError, User, UserStore, USERS_SCHEMA_SQL,
};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Connection, SqlitePool,
};
use std::{str::FromStr, time::Duration};
use tracing::{info_span, Instrument};

/// `SQLite`-backed user store sharing one connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database behind `dsn` and apply the schema.
    ///
    /// # Errors
    /// Returns an error if the DSN is invalid, the file cannot be opened, or the
    /// schema cannot be applied.
    pub async fn connect(dsn: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(dsn)
            .map_err(StoreError::Connect)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .test_before_acquire(true)
            .connect_with(options)
            .await
            .map_err(StoreError::Connect)?;

        let store = Self::from_pool(pool);
        store.ensure_schema().await?;

        Ok(store)
    }

    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the `users` table if absent.
    ///
    /// # Errors
    /// Returns [`StoreError::Schema`] if the statement fails.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let span = info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "CREATE",
            db.statement = USERS_SCHEMA_SQL
        );
        sqlx::query(USERS_SCHEMA_SQL)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(StoreError::Schema)?;

        Ok(())
    }

    /// Look up a user by username.
    ///
    /// # Errors
    /// Returns [`StoreError::Query`] if the lookup fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query = "SELECT id, username, email, password FROM users WHERE username = ?";
        let span = info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query_as::<_, User>(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(StoreError::Query)
    }

    /// Number of stored users.
    ///
    /// # Errors
    /// Returns [`StoreError::Query`] if the count fails.
    pub async fn user_count(&self) -> Result<i64, StoreError> {
        let query = "SELECT COUNT(*) FROM users";
        let span = info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query_scalar::<_, i64>(query)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .map_err(StoreError::Query)
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "sqlite",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .map_err(StoreError::Query)?;

        let ping_span = info_span!("db.ping", db.system = "sqlite", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .map_err(StoreError::Query)
    }

    async fn is_registered(&self, username: &str, email: &str) -> Result<bool, StoreError> {
        let query = "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? OR email = ?)";
        let span = info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "SELECT",
            db.statement = query
        );
        let exists = sqlx::query_scalar::<_, i64>(query)
            .bind(username)
            .bind(email)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .map_err(StoreError::Query)?;

        Ok(exists != 0)
    }

    async fn insert(&self, user: &NewUser) -> Result<InsertOutcome, StoreError> {
        let query = "INSERT INTO users (username, email, password) VALUES (?, ?, ?)";
        let span = info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "INSERT",
            db.statement = query
        );
        match sqlx::query(query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
        {
            Ok(result) => Ok(InsertOutcome::Created(result.last_insert_rowid())),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
            Err(err) => Err(StoreError::Query(err)),
        }
    }
}
