//! Core types for Snippetbox.
//!
//! Type-safe wrappers for the identifiers and values shared between the web
//! server and the CLI.

pub mod email;
pub mod id;

pub use email::{Email, EmailError};
pub use id::{SnippetId, UserId};
