//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                  - Latest snippets
//! GET  /snippet/{id}      - Snippet detail
//! GET  /user/signup       - Signup form
//! POST /user/signup       - Signup action
//! GET  /user/login        - Login form
//! POST /user/login        - Login action
//!
//! # Protected (authentication gate)
//! GET  /snippet/create    - Create form
//! POST /snippet/create    - Create action
//! POST /user/logout       - Logout action
//!
//! # Probes (no session)
//! GET  /ping              - "OK"
//! GET  /health            - Liveness
//! GET  /health/ready      - Readiness (database)
//! ```

pub mod health;
pub mod home;
pub mod page;
pub mod snippets;
pub mod user;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::require_authenticated_user;
use crate::state::AppState;

pub use page::PageContext;

/// Routes open to anonymous visitors.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/snippet/{id}", get(snippets::show))
        .route("/user/signup", get(user::signup_form).post(user::signup))
        .route("/user/login", get(user::login_form).post(user::login))
}

/// Routes that require a logged-in user.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/snippet/create",
            get(snippets::create_form).post(snippets::create),
        )
        .route("/user/logout", post(user::logout))
        .route_layer(middleware::from_fn(require_authenticated_user))
}
