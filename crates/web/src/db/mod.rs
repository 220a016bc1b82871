//! Database access for the snippet server.
//!
//! # Database: `snippetbox`
//!
//! ## Tables
//!
//! - `snippets` - Snippet text with creation and expiry timestamps
//! - `users` - Accounts with Argon2 password hashes
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p snippetbox-cli -- migrate
//! ```
//!
//! Handlers and middleware only see the [`UserStore`] and [`SnippetStore`]
//! traits, so the `PostgreSQL` repositories can be swapped for in-memory
//! stores in tests.

#[cfg(test)]
pub mod memory;
pub mod snippets;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use snippetbox_core::{Email, SnippetId, UserId};

use crate::models::{Snippet, User};

pub use snippets::PgSnippetRepository;
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Account lookups and registration.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch an active user by ID. `Ok(None)` means no such active user.
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Insert a new user and return its ID.
    ///
    /// Fails with `RepositoryError::Conflict` if the email is taken.
    async fn insert(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<UserId, RepositoryError>;

    /// Fetch the ID and password hash of the active user with this email.
    async fn credentials(&self, email: &Email)
    -> Result<Option<(UserId, String)>, RepositoryError>;
}

/// Snippet persistence. Expired snippets are invisible to reads.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Insert a snippet that expires `expires_days` from now and return its ID.
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_days: i32,
    ) -> Result<SnippetId, RepositoryError>;

    /// Fetch an unexpired snippet by ID.
    async fn get(&self, id: SnippetId) -> Result<Option<Snippet>, RepositoryError>;

    /// The newest unexpired snippets, newest first.
    async fn latest(&self, limit: u32) -> Result<Vec<Snippet>, RepositoryError>;
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
