//! OS process plumbing: spawning, output readers, and group shutdown.

mod runner;
pub mod shutdown;
mod stream;

pub use runner::ShellCommandRunner;
pub use shutdown::shutdown_child;
