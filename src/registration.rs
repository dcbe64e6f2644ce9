//! Registration flow: presence check, uniqueness check, hash, insert.

use crate::store::{InsertOutcome, NewUser, StoreError, UserStore};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// bcrypt work factor for stored password hashes.
pub const BCRYPT_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("username, email and password are required")]
    MissingFields,
    #[error("username or email already registered")]
    AlreadyRegistered,
    #[error("failed to check for existing users")]
    Lookup(#[source] StoreError),
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("failed to insert user")]
    Insert(#[source] StoreError),
}

/// A registration whose fields are all present and non-empty.
pub struct Candidate {
    username: String,
    email: String,
    password: SecretString,
}

impl Candidate {
    /// Build a candidate from raw, possibly absent form fields.
    ///
    /// # Errors
    /// Returns [`RegisterError::MissingFields`] if any field is absent or empty.
    pub fn from_fields(
        username: Option<String>,
        email: Option<String>,
        password: Option<SecretString>,
    ) -> Result<Self, RegisterError> {
        let username = username.filter(|value| !value.is_empty());
        let email = email.filter(|value| !value.is_empty());
        let password = password.filter(|value| !value.expose_secret().is_empty());

        match (username, email, password) {
            (Some(username), Some(email), Some(password)) => Ok(Self {
                username,
                email,
                password,
            }),
            _ => Err(RegisterError::MissingFields),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Owns the store handle and runs registrations against it.
#[derive(Clone)]
pub struct Registrar {
    store: Arc<dyn UserStore>,
}

impl Registrar {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    /// Register a candidate and return the new user's id.
    ///
    /// # Errors
    /// Returns [`RegisterError::AlreadyRegistered`] when the username or email is
    /// taken (including a concurrent insert winning the race), or a store/hash error.
    #[instrument(skip(self))]
    pub async fn register(&self, candidate: Candidate) -> Result<i64, RegisterError> {
        let registered = self
            .store
            .is_registered(&candidate.username, &candidate.email)
            .await
            .map_err(RegisterError::Lookup)?;

        if registered {
            return Err(RegisterError::AlreadyRegistered);
        }

        let Candidate {
            username,
            email,
            password,
        } = candidate;

        let password_hash = hash_password(password).await?;

        let user = NewUser {
            username,
            email,
            password_hash,
        };

        match self.store.insert(&user).await {
            Ok(InsertOutcome::Created(id)) => {
                debug!(user_id = id, "user inserted");
                Ok(id)
            }
            Ok(InsertOutcome::Conflict) => Err(RegisterError::AlreadyRegistered),
            Err(err) => Err(RegisterError::Insert(err)),
        }
    }
}

/// bcrypt is CPU bound, keep it off the async workers.
async fn hash_password(password: SecretString) -> Result<String, RegisterError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password.expose_secret(), BCRYPT_COST))
        .await
        .map_err(|err| RegisterError::Hash(err.to_string()))?
        .map_err(|err| RegisterError::Hash(err.to_string()))
}
