//! Axum web adapter for pkgstore.
//!
//! Serves the package catalog as JSON and streams install/remove progress
//! as server-sent events. [`bootstrap`] wires the runtime adapters into an
//! [`AxumContext`]; [`create_router`] and [`create_spa_router`] turn that
//! context into a router.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings for test infrastructure
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use hyper as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sse;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, CorsConfig, ServerConfig, bootstrap, serve, start_server};
pub use error::HttpError;
pub use routes::{create_router, create_spa_router};
pub use state::AppState;
