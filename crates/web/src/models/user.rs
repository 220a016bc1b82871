//! User domain type.

use chrono::{DateTime, Utc};

use snippetbox_core::{Email, UserId};

/// An active account. The password hash never leaves the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}
