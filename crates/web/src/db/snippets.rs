//! `PostgreSQL` snippet repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use snippetbox_core::SnippetId;

use super::{RepositoryError, SnippetStore};
use crate::models::Snippet;

#[derive(sqlx::FromRow)]
struct SnippetRow {
    id: SnippetId,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SnippetRow> for Snippet {
    fn from(row: SnippetRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// Repository for the `snippets` table.
#[derive(Clone)]
pub struct PgSnippetRepository {
    pool: PgPool,
}

impl PgSnippetRepository {
    /// Create a new snippet repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnippetStore for PgSnippetRepository {
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_days: i32,
    ) -> Result<SnippetId, RepositoryError> {
        let id = sqlx::query_scalar::<_, SnippetId>(
            r"
            INSERT INTO snippets (title, content, created_at, expires_at)
            VALUES ($1, $2, NOW(), NOW() + make_interval(days => $3))
            RETURNING id
            ",
        )
        .bind(title)
        .bind(content)
        .bind(expires_days)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get(&self, id: SnippetId) -> Result<Option<Snippet>, RepositoryError> {
        let row = sqlx::query_as::<_, SnippetRow>(
            r"
            SELECT id, title, content, created_at, expires_at
            FROM snippets
            WHERE id = $1 AND expires_at > NOW()
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Snippet::from))
    }

    async fn latest(&self, limit: u32) -> Result<Vec<Snippet>, RepositoryError> {
        let rows = sqlx::query_as::<_, SnippetRow>(
            r"
            SELECT id, title, content, created_at, expires_at
            FROM snippets
            WHERE expires_at > NOW()
            ORDER BY id DESC
            LIMIT $1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Snippet::from).collect())
    }
}
