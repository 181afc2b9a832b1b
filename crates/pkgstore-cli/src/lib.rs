//! Command-line interface for pkgstore.
//!
//! `pkgstore serve` runs the web server; `pkgstore stream` runs a single
//! install/remove session in the terminal and prints the same SSE frames a
//! browser would receive.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;

// Used by the binary only
use dotenvy as _;

pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;

// Re-export primary types for convenient access
pub use commands::Commands;
pub use config::{ServeArgs, StoreArgs, StreamArgs};
pub use error::CliError;
pub use parser::Cli;
