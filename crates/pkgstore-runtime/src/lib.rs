//! Runtime adapters for pkgstore.
//!
//! Implements the [`pkgstore_core::CommandRunner`] and
//! [`pkgstore_core::PackageCatalogPort`] ports with real processes: the
//! package manager is launched in its own process group, its output is
//! streamed back as decoded chunks, and the group is stopped with
//! SIGTERM then SIGKILL when a session is abandoned.

#![deny(unsafe_code)]

mod command;
pub mod ports_impl;
pub mod process;
mod signal;

pub use command::capture_stdout;
pub use ports_impl::PkgCatalog;
pub use process::{ShellCommandRunner, shutdown_child};
pub use signal::shutdown_signal;
