//! Domain models.
//!
//! These types are independent of the database row types in `db`.

pub mod session;
pub mod snippet;
pub mod user;

pub use session::keys as session_keys;
pub use snippet::Snippet;
pub use user::User;
