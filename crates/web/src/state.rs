//! Application state shared across handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{PgSnippetRepository, PgUserRepository, SnippetStore, UserStore};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the collaborators the middleware chain
/// and routes need; there are no process-wide singletons.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    users: Arc<dyn UserStore>,
    snippets: Arc<dyn SnippetStore>,
}

impl AppState {
    /// Create application state from explicit stores.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, snippets: Arc<dyn SnippetStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { users, snippets }),
        }
    }

    /// Create application state backed by `PostgreSQL` repositories.
    #[must_use]
    pub fn with_pool(pool: &PgPool) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgSnippetRepository::new(pool.clone())),
        )
    }

    /// The user store.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// The snippet store.
    #[must_use]
    pub fn snippets(&self) -> &dyn SnippetStore {
        self.inner.snippets.as_ref()
    }
}
