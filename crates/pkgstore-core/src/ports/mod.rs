//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `tokio::process` types in any signature
//! - Output reaches the core as decoded text chunks, never raw pipes
//! - The package manager is reached only through these traits

pub mod package_catalog;
pub mod process_runner;

use thiserror::Error;

use crate::domain::ValidationError;
use crate::settings::SettingsError;

pub use package_catalog::PackageCatalogPort;
pub use process_runner::{
    CommandRunner, CommandSpec, ExitOutcome, OutputChunk, OutputStream, ProcessHandle,
    RunningCommand, SIGNAL_EXIT_CODE,
};

/// Domain-specific errors for process runner operations.
///
/// This error type abstracts away process management implementation details
/// and provides a clean interface for services to handle process failures.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The executable could not be started at all.
    #[error("Failed to spawn {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    /// Waiting on or signalling a running process failed.
    #[error("Process I/O failed: {0}")]
    Io(String),

    /// The process could not be stopped.
    #[error("Failed to stop: {0}")]
    StopFailed(String),
}

/// Core error type for semantic domain errors.
///
/// This is the canonical error type used across the core domain.
/// Adapters should map this to their own error types (HTTP status codes,
/// CLI exit codes).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Process operation failed.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Validation error (invalid input).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Settings validation error.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Another session already owns this package.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The package manager could not answer a catalog query.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal error (unexpected condition).
    #[error("Internal error: {0}")]
    Internal(String),
}
