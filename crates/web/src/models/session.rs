//! Keys for values kept in the server-side session.

/// Session keys.
pub mod keys {
    /// ID of the logged-in user (`i32`).
    pub const AUTHENTICATED_USER_ID: &str = "userID";

    /// One-shot status message shown on the next rendered page.
    pub const FLASH: &str = "flash";
}
