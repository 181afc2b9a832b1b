//! HTTP request handlers for the Axum web server.
//!
//! Each submodule contains handlers for a specific API area.
//! Handlers are thin wrappers over the catalog port and session controller.

pub mod logos;
pub mod packages;
pub mod stream;
