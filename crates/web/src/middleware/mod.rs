//! HTTP middleware chain.
//!
//! # Order (outermost first)
//!
//! 1. Sentry hub and transaction layers
//! 2. Panic recovery (`recover`)
//! 3. Security headers
//! 4. Request log
//! 5. Router. Dynamic routes additionally get:
//!    1. Session layer (tower-sessions with `PostgreSQL` store)
//!    2. CSRF guard
//!    3. Session authenticator
//!    4. Authentication gate (protected routes only, via `route_layer`)

pub mod auth;
pub mod authenticate;
pub mod csrf;
pub mod recover;
pub mod request_log;
pub mod security_headers;
pub mod session;

pub use auth::{LoginRedirect, require_authenticated_user};
pub use authenticate::{AuthenticatedUser, OptionalAuth, authenticate};
pub use csrf::{CsrfCookie, CsrfToken, csrf_middleware};
pub use recover::recover_panic_layer;
pub use request_log::log_request_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, session_layer};
