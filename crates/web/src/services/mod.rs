//! Business logic services.
//!
//! - `auth` - Signup and password login

pub mod auth;
