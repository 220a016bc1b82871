//! Snippetbox Core - Shared types library.
//!
//! Common types used across the Snippetbox crates:
//! - `web` - The snippet server and its middleware chain
//! - `cli` - Migrations and user management
//!
//! The core crate holds only types, no I/O. Database encoding for IDs is
//! behind the `postgres` feature.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
