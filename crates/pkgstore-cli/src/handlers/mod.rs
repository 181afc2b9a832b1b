//! Command handlers.
//!
//! Handlers are thin wrappers that:
//! 1. Turn CLI arguments into settings
//! 2. Call into the axum bootstrap or the session controller
//! 3. Format output for the terminal

pub mod serve;
pub mod stream;
