//! Session layer configuration.

use sqlx::PgPool;
use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore,
    cookie::{SameSite, time::Duration},
};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "snippetbox_session";

/// Idle lifetime of a session.
const SESSION_LIFETIME_HOURS: i64 = 12;

/// Session layer over any store; `secure` marks the cookie `Secure`.
#[must_use]
pub fn session_layer<Store: SessionStore>(store: Store, secure: bool) -> SessionManagerLayer<Store> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_LIFETIME_HOURS)))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Session layer backed by the `PostgreSQL` store.
///
/// The store's table is created by `sb-cli migrate`, not here.
#[must_use]
pub fn create_session_layer(pool: &PgPool, config: &WebConfig) -> SessionManagerLayer<PostgresStore> {
    session_layer(PostgresStore::new(pool.clone()), config.is_https())
}
