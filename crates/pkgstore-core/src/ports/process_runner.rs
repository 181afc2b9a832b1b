//! Command runner trait definition.
//!
//! This port launches one external process and hands back its output as a
//! channel of text chunks plus a handle for the exit status. Implementations
//! own every OS-level detail (pipes, signals, reaping).

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::ProcessError;

/// Exit code reported when the process was killed by a signal.
///
/// Real exit statuses are always in `0..=255`, so this cannot collide.
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Program and argument vector for one spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Run `script` through a shell, e.g. `bash -lc "<script>"`.
    #[must_use]
    pub fn shell(program: &str, flag: &str, script: impl Into<String>) -> Self {
        Self::new(program).arg(flag).arg(script)
    }

    /// Human-readable rendering for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Which pipe a chunk was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// A chunk of process output, decoded lossily as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    pub stream: OutputStream,
    pub text: String,
}

impl OutputChunk {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stream: OutputStream::Stdout,
            text: text.into(),
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            stream: OutputStream::Stderr,
            text: text.into(),
        }
    }
}

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Exit status, or [`SIGNAL_EXIT_CODE`] if terminated by a signal.
    pub code: i32,
}

impl ExitOutcome {
    pub const fn code(code: i32) -> Self {
        Self { code }
    }

    pub const fn signalled() -> Self {
        Self {
            code: SIGNAL_EXIT_CODE,
        }
    }

    pub const fn success(self) -> bool {
        self.code == 0
    }
}

/// Control over one running process.
#[async_trait]
pub trait ProcessHandle: Send {
    /// OS process id, if still known.
    fn id(&self) -> Option<u32>;

    /// Wait for the process to exit and reap it.
    ///
    /// Cancel-safe: dropping the future leaves the process running and the
    /// handle usable.
    async fn wait(&mut self) -> Result<ExitOutcome, ProcessError>;

    /// Stop the process and reap it.
    async fn terminate(&mut self) -> Result<ExitOutcome, ProcessError>;
}

/// A started process: its merged output channel and its control handle.
///
/// The channel closes once both stdout and stderr reach EOF.
pub struct RunningCommand {
    pub output: mpsc::Receiver<OutputChunk>,
    pub handle: Box<dyn ProcessHandle>,
}

impl std::fmt::Debug for RunningCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningCommand")
            .field("pid", &self.handle.id())
            .finish_non_exhaustive()
    }
}

/// Starts external processes.
///
/// `spawn` is synchronous so that a missing executable is reported to the
/// caller before any stream is opened.
pub trait CommandRunner: Send + Sync {
    fn spawn(&self, spec: &CommandSpec) -> Result<RunningCommand, ProcessError>;
}
