//! In-memory stores for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use snippetbox_core::{Email, SnippetId, UserId};

use super::{RepositoryError, SnippetStore, UserStore};
use crate::models::{Snippet, User};

struct StoredUser {
    user: User,
    password_hash: String,
}

/// `UserStore` backed by a vector, with lookup counting and failure injection.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<StoredUser>>,
    lookups: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryUserStore {
    /// Seed a user with a fixed ID.
    #[allow(clippy::unwrap_used)]
    pub fn with_user(self, id: i32, name: &str, email: &str, password_hash: &str) -> Self {
        self.users.lock().unwrap().push(StoredUser {
            user: User {
                id: UserId::new(id),
                name: name.to_string(),
                email: Email::parse(email).unwrap(),
                created_at: Utc::now(),
            },
            password_hash: password_hash.to_string(),
        });
        self
    }

    /// Make every `get` fail as if the database were unreachable.
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// Number of `get` calls so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
#[allow(clippy::unwrap_used)]
impl UserStore for MemoryUserStore {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|s| s.user.id == id).map(|s| s.user.clone()))
    }

    async fn insert(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<UserId, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|s| &s.user.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_string()));
        }
        let next = users.iter().map(|s| s.user.id.as_i32()).max().unwrap_or(0) + 1;
        let id = UserId::new(next);
        users.push(StoredUser {
            user: User {
                id,
                name: name.to_string(),
                email: email.clone(),
                created_at: Utc::now(),
            },
            password_hash: password_hash.to_string(),
        });
        Ok(id)
    }

    async fn credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(UserId, String)>, RepositoryError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|s| &s.user.email == email)
            .map(|s| (s.user.id, s.password_hash.clone())))
    }
}

/// `SnippetStore` backed by a vector.
#[derive(Default)]
pub struct MemorySnippetStore {
    snippets: Mutex<Vec<Snippet>>,
}

#[async_trait]
#[allow(clippy::unwrap_used)]
impl SnippetStore for MemorySnippetStore {
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_days: i32,
    ) -> Result<SnippetId, RepositoryError> {
        let mut snippets = self.snippets.lock().unwrap();
        let id = SnippetId::new(i32::try_from(snippets.len()).unwrap() + 1);
        let now = Utc::now();
        snippets.push(Snippet {
            id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            expires_at: now + Duration::days(i64::from(expires_days)),
        });
        Ok(id)
    }

    async fn get(&self, id: SnippetId) -> Result<Option<Snippet>, RepositoryError> {
        let now = Utc::now();
        let snippets = self.snippets.lock().unwrap();
        Ok(snippets
            .iter()
            .find(|s| s.id == id && s.expires_at > now)
            .cloned())
    }

    async fn latest(&self, limit: u32) -> Result<Vec<Snippet>, RepositoryError> {
        let now = Utc::now();
        let snippets = self.snippets.lock().unwrap();
        Ok(snippets
            .iter()
            .rev()
            .filter(|s| s.expires_at > now)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
