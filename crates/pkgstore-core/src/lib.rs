//! Core domain for pkgstore: a web front-end that streams package-manager
//! progress to a browser.
//!
//! This crate holds everything that does not need an OS process or a
//! socket: package validation, the stage classifier, the stream event model
//! and its SSE framing, catalog parsing, settings, and the session
//! controller that ties them together behind the [`ports`] traits.

#![deny(unsafe_code)]

pub mod catalog;
pub mod domain;
pub mod events;
pub mod ports;
pub mod services;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use catalog::{FeaturedCatalog, infer_category, parse_available, parse_installed, repo_name};
pub use domain::{PackageAction, PackageDescriptor, PackageName, Stage, ValidationError, classify};
pub use events::{StreamEvent, WireError, WireFrame};
pub use ports::{
    CommandRunner, CommandSpec, CoreError, ExitOutcome, OutputChunk, OutputStream,
    PackageCatalogPort, ProcessError, ProcessHandle, RunningCommand, SIGNAL_EXIT_CODE,
};
pub use services::{
    EventStream, SessionController, SessionLease, SessionRegistry, StreamRequest, StreamSession,
};
pub use settings::{
    DEFAULT_PORT, SettingsError, StoreSettings, default_sources_dir, validate_settings,
};
