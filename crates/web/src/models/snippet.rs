//! Snippet domain type.

use chrono::{DateTime, Utc};

use snippetbox_core::SnippetId;

/// A stored text snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub id: SnippetId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Lifetimes offered on the create form, in days.
pub const PERMITTED_EXPIRY_DAYS: [i32; 3] = [365, 7, 1];

/// Longest accepted title, in characters.
pub const MAX_TITLE_CHARS: usize = 100;
