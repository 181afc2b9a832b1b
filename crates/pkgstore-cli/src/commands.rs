//! Main commands enum.

use clap::Subcommand;

use crate::config::{ServeArgs, StreamArgs};

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve(ServeArgs),

    /// Install or remove one package here, printing progress as SSE frames
    ///
    /// Exits with the package manager's exit status.
    Stream(StreamArgs),
}
