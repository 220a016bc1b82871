//! Authentication gate for protected routes.

use axum::{
    extract::Request,
    http::{StatusCode, header::LOCATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::authenticate::AuthenticatedUser;

/// Where anonymous requests to protected routes are sent.
///
/// Relative: the browser resolves it against the request path, so
/// `/snippet/create` lands on `/snippet/user/login`.
pub const LOGIN_REDIRECT_TARGET: &str = "user/login";

/// `302 Found` to the login page.
#[derive(Debug, Clone, Copy)]
pub struct LoginRedirect;

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        // `Redirect::to` answers 303, the gate has always answered 302
        (StatusCode::FOUND, [(LOCATION, LOGIN_REDIRECT_TARGET)]).into_response()
    }
}

/// Let the request through only if [`authenticate`](super::authenticate::authenticate)
/// attached a user.
///
/// Applied with `route_layer` to the protected routes only.
pub async fn require_authenticated_user(request: Request, next: Next) -> Response {
    if request.extensions().get::<AuthenticatedUser>().is_none() {
        return LoginRedirect.into_response();
    }
    next.run(request).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, middleware, routing::get};
    use chrono::Utc;
    use tower::ServiceExt;

    use snippetbox_core::{Email, UserId};

    use super::*;
    use crate::models::User;

    fn app() -> Router {
        Router::new()
            .route("/snippet/create", get(|| async { "form" }))
            .route_layer(middleware::from_fn(require_authenticated_user))
            .route("/", get(|| async { "home" }))
    }

    fn alice() -> AuthenticatedUser {
        AuthenticatedUser(User {
            id: UserId::new(1),
            name: "Alice".to_string(),
            email: Email::parse("alice@example.com").unwrap(),
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_anonymous_request_is_redirected() {
        let response = app()
            .oneshot(Request::builder().uri("/snippet/create").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "user/login");
    }

    #[tokio::test]
    async fn test_authenticated_request_passes() {
        let mut request = Request::builder()
            .uri("/snippet/create")
            .body(Body::empty())
            .unwrap();
        request.extensions_mut().insert(alice());

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unprotected_route_is_not_gated() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
