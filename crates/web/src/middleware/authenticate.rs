//! Resolve the logged-in user from the session.
//!
//! Runs on every dynamic route. The resolved user travels as a typed request
//! extension ([`AuthenticatedUser`]); handlers and the gate read it from
//! there instead of going back to the session.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

use snippetbox_core::UserId;

use super::auth::LoginRedirect;
use crate::error::AppError;
use crate::models::{User, session_keys};
use crate::state::AppState;

/// The user behind the current request's session.
///
/// Usable as an extractor on protected routes; rejects with the same redirect
/// as the gate.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or(LoginRedirect)
    }
}

/// Extractor for pages that render differently for logged-in users.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|AuthenticatedUser(user)| user.clone()),
        ))
    }
}

/// Attach [`AuthenticatedUser`] when the session names an active user.
///
/// - no `userID` in the session: pass through, the store is not queried;
/// - `userID` names no active user: drop the key and pass through;
/// - store or session failure: `500` via [`AppError`], downstream not called.
///
/// # Errors
///
/// Returns `AppError` when the session or user store fails.
pub async fn authenticate(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(raw_id) = session
        .get::<i32>(session_keys::AUTHENTICATED_USER_ID)
        .await?
    else {
        return Ok(next.run(request).await);
    };

    let Some(user) = state.users().get(UserId::new(raw_id)).await? else {
        tracing::debug!(user_id = raw_id, "Session names unknown or inactive user");
        session
            .remove::<i32>(session_keys::AUTHENTICATED_USER_ID)
            .await?;
        return Ok(next.run(request).await);
    };

    let (mut parts, body) = request.into_parts();
    parts.extensions.insert(AuthenticatedUser(user));
    Ok(next.run(Request::from_parts(parts, body)).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        extract::Path,
        http::{StatusCode, header::COOKIE, header::SET_COOKIE},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::db::memory::{MemorySnippetStore, MemoryUserStore};
    use crate::middleware::session::session_layer;

    async fn whoami(OptionalAuth(user): OptionalAuth) -> String {
        user.map_or_else(|| "anonymous".to_string(), |u| u.name)
    }

    async fn remembered_id(session: Session) -> String {
        format!(
            "{:?}",
            session
                .get::<i32>(session_keys::AUTHENTICATED_USER_ID)
                .await
                .unwrap()
        )
    }

    async fn log_in_as(session: Session, Path(id): Path<i32>) -> &'static str {
        session
            .insert(session_keys::AUTHENTICATED_USER_ID, id)
            .await
            .unwrap();
        "ok"
    }

    fn app(users: Arc<MemoryUserStore>) -> Router {
        let state = AppState::new(users, Arc::new(MemorySnippetStore::default()));
        Router::new()
            .route("/whoami", get(whoami))
            .route("/remembered", get(remembered_id))
            .route("/login-as/{id}", get(log_in_as))
            .layer(middleware::from_fn_with_state(state, authenticate))
            .layer(session_layer(MemoryStore::default(), false))
    }

    async fn call(app: &Router, uri: &str, cookie: Option<&str>) -> (StatusCode, Option<String>, String) {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let response = app
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, set_cookie, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn session_for(app: &Router, id: i32) -> String {
        let (_, cookie, _) = call(app, &format!("/login-as/{id}"), None).await;
        cookie.unwrap()
    }

    #[tokio::test]
    async fn test_no_session_skips_user_lookup() {
        let users = Arc::new(MemoryUserStore::default().with_user(1, "Alice", "alice@example.com", "x"));
        let app = app(users.clone());

        let (status, _, body) = call(&app, "/whoami", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
        assert_eq!(users.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_known_user_is_attached() {
        let users = Arc::new(MemoryUserStore::default().with_user(1, "Alice", "alice@example.com", "x"));
        let app = app(users.clone());
        let cookie = session_for(&app, 1).await;

        let (status, _, body) = call(&app, "/whoami", Some(&cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Alice");
        assert!(users.lookup_count() >= 1);
    }

    #[tokio::test]
    async fn test_unknown_user_clears_session_key() {
        let users = Arc::new(MemoryUserStore::default());
        let app = app(users);
        let cookie = session_for(&app, 42).await;

        let (status, _, body) = call(&app, "/whoami", Some(&cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");

        let (_, _, remembered) = call(&app, "/remembered", Some(&cookie)).await;
        assert_eq!(remembered, "None");
    }

    #[tokio::test]
    async fn test_store_failure_is_500_and_handler_skipped() {
        let users = Arc::new(MemoryUserStore::default().failing());
        let app = app(users);
        let cookie = session_for(&app, 1).await;

        let (status, _, body) = call(&app, "/whoami", Some(&cookie)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal Server Error");
    }
}
