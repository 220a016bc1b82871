//! Data every rendered page needs, plus shared view types.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::{CsrfToken, OptionalAuth};
use crate::models::{Snippet, session_keys};

/// Per-request context for the base layout.
///
/// Extracting it consumes the flash message, so it shows exactly once.
#[derive(Debug, Clone)]
pub struct PageContext {
    /// Masked CSRF token for hidden form inputs.
    pub csrf_token: String,
    pub flash: Option<String>,
    pub is_authenticated: bool,
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(csrf) = CsrfToken::from_request_parts(parts, state).await;
        let Ok(OptionalAuth(user)) = OptionalAuth::from_request_parts(parts, state).await;

        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;
        let flash = session.remove::<String>(session_keys::FLASH).await?;

        Ok(Self {
            csrf_token: csrf.value().to_string(),
            flash,
            is_authenticated: user.is_some(),
        })
    }
}

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn set_flash(session: &Session, message: &str) -> Result<(), AppError> {
    session.insert(session_keys::FLASH, message).await?;
    Ok(())
}

/// A snippet as templates show it.
#[derive(Debug, Clone)]
pub struct SnippetView {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created: String,
    pub expires: String,
}

impl From<&Snippet> for SnippetView {
    fn from(snippet: &Snippet) -> Self {
        Self {
            id: snippet.id.as_i32(),
            title: snippet.title.clone(),
            content: snippet.content.clone(),
            created: human_date(snippet.created_at),
            expires: human_date(snippet.expires_at),
        }
    }
}

/// `02 Jan 2006 at 15:04` style, in UTC.
#[must_use]
pub fn human_date(at: DateTime<Utc>) -> String {
    at.format("%d %b %Y at %H:%M").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_human_date() {
        let at = Utc.with_ymd_and_hms(2024, 3, 17, 10, 15, 0).unwrap();
        assert_eq!(human_date(at), "17 Mar 2024 at 10:15");
    }

    #[test]
    fn test_snippet_view_formats_dates() {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap();
        let snippet = Snippet {
            id: snippetbox_core::SnippetId::new(5),
            title: "An old silent pond".to_string(),
            content: "A frog jumps into the pond".to_string(),
            created_at: created,
            expires_at: created + chrono::Duration::days(7),
        };

        let view = SnippetView::from(&snippet);
        assert_eq!(view.id, 5);
        assert_eq!(view.created, "02 Jan 2024 at 03:04");
        assert_eq!(view.expires, "09 Jan 2024 at 03:04");
    }
}
