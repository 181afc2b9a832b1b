//! CLI-specific error types and mappings.
//!
//! This module provides error types for the CLI adapter and mappings
//! from CoreError to exit codes and user-facing messages.

use pkgstore_core::{CoreError, WireError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Argument validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (writing to stdout failed, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Process execution error.
    #[error("Process error: {0}")]
    Process(String),

    /// Stopped by Ctrl-C or SIGTERM.
    #[error("Interrupted")]
    Interrupted,
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    /// - 130: Interrupted (128 + SIGINT)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Process(_) => 71,  // EX_OSERR
            Self::Interrupted => 130,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Process(proc_err) => Self::Process(proc_err.to_string()),
            CoreError::Settings(settings_err) => Self::Config(settings_err.to_string()),
            CoreError::Validation(e) => Self::Arguments(e.to_string()),
            CoreError::Configuration(msg) => Self::Config(msg),
            CoreError::Conflict(msg) => Self::Core(format!("Conflict: {msg}")),
            CoreError::ExternalService(msg) => Self::Core(format!("External service: {msg}")),
            CoreError::Internal(msg) => Self::Core(msg),
        }
    }
}

impl From<WireError> for CliError {
    fn from(err: WireError) -> Self {
        Self::Core(format!("Encoding event: {err}"))
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgstore_core::{ProcessError, ValidationError};

    #[test]
    fn validation_is_a_usage_error() {
        let err = CliError::from(CoreError::from(ValidationError::InvalidAction(
            "upgrade".to_string(),
        )));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn spawn_failure_is_an_os_error() {
        let err = CliError::from(CoreError::from(ProcessError::SpawnFailed {
            program: "bash".to_string(),
            reason: "not found".to_string(),
        }));
        assert_eq!(err.exit_code(), 71);
        assert!(err.to_string().contains("bash"));
    }
}
