//! Router assembly.
//!
//! Builds the full middleware chain around the routes. `main` adds the
//! Sentry layers on top and serves the result; tests drive it in-process.

use std::path::Path;

use axum::{Router, middleware, routing::get};
use tower_http::services::ServeDir;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::{
    CsrfCookie, authenticate, csrf_middleware, log_request_middleware, recover_panic_layer,
    security_headers_middleware,
};
use crate::routes::{self, health};
use crate::state::AppState;

/// Build the application router.
///
/// `probes` carries extra session-less routes (the database readiness check
/// in production), mounted beside `/ping` and `/health`.
pub fn router<Store>(
    state: AppState,
    sessions: SessionManagerLayer<Store>,
    static_dir: impl AsRef<Path>,
    probes: Router,
) -> Router
where
    Store: SessionStore + Clone,
{
    let dynamic = routes::public_routes()
        .merge(routes::protected_routes())
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(middleware::from_fn_with_state(
            CsrfCookie::default(),
            csrf_middleware,
        ))
        .layer(sessions)
        .with_state(state);

    Router::new()
        .route("/ping", get(health::ping))
        .route("/health", get(health::health))
        .merge(probes)
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .merge(dynamic)
        .layer(middleware::from_fn(log_request_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(recover_panic_layer())
}
