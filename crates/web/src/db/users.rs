//! `PostgreSQL` user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use snippetbox_core::{Email, UserId};

use super::{RepositoryError, UserStore, conflict_on_unique};
use crate::models::User;

/// Row shape of `users` without the password hash.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email for user {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            created_at: row.created_at,
        })
    }
}

/// Repository for the `users` table.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, created_at
            FROM users
            WHERE id = $1 AND active
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn insert(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<UserId, RepositoryError> {
        sqlx::query_scalar::<_, UserId>(
            r"
            INSERT INTO users (name, email, hashed_password)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))
    }

    async fn credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(UserId, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, (UserId, String)>(
            r"
            SELECT id, hashed_password
            FROM users
            WHERE email = $1 AND active
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
