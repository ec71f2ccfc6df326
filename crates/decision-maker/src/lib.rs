//! Decision maker HTTP service
//!
//! Wires the core library into an axum server and loads its configuration.

pub mod api;
pub mod config;
