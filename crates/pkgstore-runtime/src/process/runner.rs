//! `CommandRunner` backed by real OS processes.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use pkgstore_core::{
    CommandRunner, CommandSpec, ExitOutcome, OutputStream, ProcessError, ProcessHandle,
    RunningCommand,
};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::shutdown::shutdown_child;
use super::stream::spawn_chunk_reader;

/// Buffered chunks between the pipe readers and the session driver.
const OUTPUT_CHANNEL_CAPACITY: usize = 64;

/// Spawns package-manager command lines with piped output.
///
/// Every child gets its own process group so that a disconnect can stop the
/// shell together with `yes`, `pkg` and `apt` underneath it.
#[derive(Debug, Clone)]
pub struct ShellCommandRunner {
    shutdown_grace: Duration,
}

impl ShellCommandRunner {
    pub const fn new(shutdown_grace: Duration) -> Self {
        Self { shutdown_grace }
    }
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl CommandRunner for ShellCommandRunner {
    fn spawn(&self, spec: &CommandSpec) -> Result<RunningCommand, ProcessError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| ProcessError::SpawnFailed {
            program: spec.program.clone(),
            reason: e.to_string(),
        })?;

        let (tx, rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_chunk_reader(stdout, OutputStream::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_chunk_reader(stderr, OutputStream::Stderr, tx));
        }

        debug!(pid = ?child.id(), command = %spec.display(), "spawned child process");

        Ok(RunningCommand {
            output: rx,
            handle: Box::new(ChildHandle {
                child,
                readers,
                shutdown_grace: self.shutdown_grace,
            }),
        })
    }
}

/// Dropping the handle aborts its pipe readers. A daemon left behind by a
/// post-install script may hold the pipes open long after the shell exits.
struct ChildHandle {
    child: Child,
    readers: Vec<JoinHandle<()>>,
    shutdown_grace: Duration,
}

impl Drop for ChildHandle {
    fn drop(&mut self) {
        for reader in &self.readers {
            reader.abort();
        }
    }
}

#[async_trait]
impl ProcessHandle for ChildHandle {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(&mut self) -> Result<ExitOutcome, ProcessError> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| ProcessError::Io(e.to_string()))?;
        Ok(outcome_from_status(status))
    }

    async fn terminate(&mut self) -> Result<ExitOutcome, ProcessError> {
        let pid = self.child.id();
        match shutdown_child(&mut self.child, self.shutdown_grace).await {
            Ok(status) => {
                debug!(?pid, %status, "child process stopped");
                Ok(outcome_from_status(status))
            }
            Err(e) => {
                warn!(?pid, error = %e, "failed to stop child process");
                Err(ProcessError::StopFailed(e.to_string()))
            }
        }
    }
}

/// A missing code means the process died from a signal.
fn outcome_from_status(status: ExitStatus) -> ExitOutcome {
    status
        .code()
        .map_or_else(ExitOutcome::signalled, ExitOutcome::code)
}
