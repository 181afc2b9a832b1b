//! Scripted command runner for tests.
//!
//! Lets session and route tests describe a package-manager run as a list of
//! steps (output, sleeps, exit) without spawning real processes. Works with
//! paused tokio time.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::ports::{
    CommandRunner, CommandSpec, ExitOutcome, OutputChunk, ProcessError, ProcessHandle,
    RunningCommand,
};

/// One step of a scripted process run.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Stdout(String),
    Stderr(String),
    Sleep(Duration),
    /// Close both pipes, then report this exit code.
    Exit(i32),
    /// Report this exit code but keep the pipes open forever.
    ExitLeavingPipesOpen(i32),
    /// Never produce anything again.
    Hang,
}

impl ScriptStep {
    pub fn stdout(text: &str) -> Self {
        Self::Stdout(text.to_string())
    }

    pub fn stderr(text: &str) -> Self {
        Self::Stderr(text.to_string())
    }

    pub const fn sleep_secs(secs: u64) -> Self {
        Self::Sleep(Duration::from_secs(secs))
    }
}

/// Command runner that replays a script for every spawn.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    script: Vec<ScriptStep>,
    spawn_error: Option<String>,
    spawned: Arc<Mutex<Vec<CommandSpec>>>,
    terminated: Arc<AtomicUsize>,
}

impl ScriptedRunner {
    pub fn new(script: Vec<ScriptStep>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// A runner whose every spawn fails like a missing executable.
    pub fn failing(reason: &str) -> Self {
        Self {
            spawn_error: Some(reason.to_string()),
            ..Self::default()
        }
    }

    /// Specs passed to `spawn`, in order.
    pub fn spawned(&self) -> Vec<CommandSpec> {
        self.spawned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn spawn_count(&self) -> usize {
        self.spawned.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// How many handles received `terminate`.
    pub fn terminated_count(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }
}

impl CommandRunner for ScriptedRunner {
    fn spawn(&self, spec: &CommandSpec) -> Result<RunningCommand, ProcessError> {
        if let Some(reason) = &self.spawn_error {
            return Err(ProcessError::SpawnFailed {
                program: spec.program.clone(),
                reason: reason.clone(),
            });
        }
        self.spawned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(spec.clone());

        let (output_tx, output_rx) = mpsc::channel(16);
        let (exit_tx, exit_rx) = oneshot::channel();
        tokio::spawn(play(self.script.clone(), output_tx, exit_tx));

        Ok(RunningCommand {
            output: output_rx,
            handle: Box::new(ScriptedHandle {
                exit: Some(exit_rx),
                outcome: None,
                terminated: Arc::clone(&self.terminated),
                killed: Arc::new(AtomicBool::new(false)),
            }),
        })
    }
}

async fn play(
    script: Vec<ScriptStep>,
    output: mpsc::Sender<OutputChunk>,
    exit: oneshot::Sender<i32>,
) {
    for step in script {
        match step {
            ScriptStep::Stdout(text) => {
                if output.send(OutputChunk::stdout(text)).await.is_err() {
                    return;
                }
            }
            ScriptStep::Stderr(text) => {
                if output.send(OutputChunk::stderr(text)).await.is_err() {
                    return;
                }
            }
            ScriptStep::Sleep(duration) => tokio::time::sleep(duration).await,
            ScriptStep::Exit(code) => {
                drop(output);
                let _ = exit.send(code);
                return;
            }
            ScriptStep::ExitLeavingPipesOpen(code) => {
                let _ = exit.send(code);
                std::future::pending::<()>().await;
                return;
            }
            ScriptStep::Hang => {
                let _keep = (output, exit);
                std::future::pending::<()>().await;
                return;
            }
        }
    }
}

struct ScriptedHandle {
    exit: Option<oneshot::Receiver<i32>>,
    outcome: Option<ExitOutcome>,
    terminated: Arc<AtomicUsize>,
    killed: Arc<AtomicBool>,
}

#[async_trait]
impl ProcessHandle for ScriptedHandle {
    fn id(&self) -> Option<u32> {
        None
    }

    async fn wait(&mut self) -> Result<ExitOutcome, ProcessError> {
        if let Some(outcome) = self.outcome {
            return Ok(outcome);
        }
        let receiver = self
            .exit
            .as_mut()
            .ok_or_else(|| ProcessError::Io("process already reaped".to_string()))?;
        let code = receiver
            .await
            .map_err(|_| ProcessError::Io("script ended without exit".to_string()))?;

        let outcome = ExitOutcome::code(code);
        self.outcome = Some(outcome);
        self.exit = None;
        Ok(outcome)
    }

    async fn terminate(&mut self) -> Result<ExitOutcome, ProcessError> {
        if !self.killed.swap(true, Ordering::SeqCst) {
            self.terminated.fetch_add(1, Ordering::SeqCst);
        }
        let outcome = ExitOutcome::signalled();
        self.outcome = Some(outcome);
        self.exit = None;
        Ok(outcome)
    }
}
