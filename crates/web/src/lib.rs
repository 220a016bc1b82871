//! Snippetbox web server library.
//!
//! The binary in `main.rs` only wires configuration, logging and the
//! listener; everything it serves is built here so tests can drive the
//! router in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
