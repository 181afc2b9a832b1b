//! Stream session controller.
//!
//! One [`StreamSession`] exists per client stream. Opening a session
//! validates the request, spawns the package manager and starts a driver
//! task that turns process output and timer ticks into [`StreamEvent`]s.
//!
//! The driver task is the only writer of a session's events, so timer ticks
//! and output chunks are naturally sequenced and frames never interleave.
//!
//! # Disconnects
//!
//! When the consumer drops its [`EventStream`] before `done`, the process is
//! terminated and reaped (kill-on-disconnect) and nothing more is emitted.
//! [`SessionController::shutdown`] does the same for every open session.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::domain::{PackageAction, PackageName, Stage, ValidationError, classify};
use crate::events::StreamEvent;
use crate::ports::{
    CommandRunner, CoreError, ExitOutcome, OutputChunk, OutputStream, ProcessError, ProcessHandle,
    RunningCommand,
};
use crate::services::session_registry::{SessionLease, SessionRegistry};
use crate::settings::StoreSettings;

/// Events buffered between the driver and a slow client.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// How long to keep reading pipes after the process has exited.
///
/// A daemon started by a post-install script can inherit stdout and keep the
/// pipe open forever; the stream must still finish.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// A validated request to run one package operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub action: PackageAction,
    pub package: PackageName,
}

impl StreamRequest {
    pub const fn new(action: PackageAction, package: PackageName) -> Self {
        Self { action, package }
    }

    /// Validate raw query values. The package name is checked first.
    pub fn parse(action: &str, package: &str) -> Result<Self, ValidationError> {
        let package = PackageName::parse(package)?;
        let action = action.parse()?;
        Ok(Self { action, package })
    }
}

/// Per-connection state, owned by the driver task.
#[derive(Debug)]
pub struct StreamSession {
    action: PackageAction,
    package: PackageName,
    started_at: DateTime<Utc>,
    started: Instant,
    stage: Stage,
}

impl StreamSession {
    pub fn new(request: StreamRequest) -> Self {
        Self {
            action: request.action,
            package: request.package,
            // `startTime` travels as epoch millis.
            started_at: Utc::now().trunc_subsecs(3),
            started: Instant::now(),
            stage: Stage::Starting,
        }
    }

    pub const fn action(&self) -> PackageAction {
        self.action
    }

    pub const fn package(&self) -> &PackageName {
        &self.package
    }

    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Whole seconds since the session started.
    pub fn elapsed_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    fn meta_event(&self) -> StreamEvent {
        StreamEvent::meta(self.action, self.package.as_str(), self.started_at)
    }
}

/// Receiving side of a session's events.
///
/// Ends after the `done` event. Dropping it early stops the session.
#[derive(Debug)]
pub struct EventStream {
    receiver: mpsc::Receiver<StreamEvent>,
}

impl EventStream {
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    pub fn into_receiver(self) -> mpsc::Receiver<StreamEvent> {
        self.receiver
    }
}

/// Opens stream sessions against a command runner.
#[derive(Clone)]
pub struct SessionController {
    runner: Arc<dyn CommandRunner>,
    settings: Arc<StoreSettings>,
    registry: Option<SessionRegistry>,
    shutdown: CancellationToken,
    drivers: TaskTracker,
}

impl SessionController {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: Arc<StoreSettings>) -> Self {
        let registry = settings.exclusive_sessions.then(SessionRegistry::new);
        Self {
            runner,
            settings,
            registry,
            shutdown: CancellationToken::new(),
            drivers: TaskTracker::new(),
        }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub const fn registry(&self) -> Option<&SessionRegistry> {
        self.registry.as_ref()
    }

    /// Number of sessions whose driver is still running.
    pub fn active_sessions(&self) -> usize {
        self.drivers.len()
    }

    /// Terminate every open session and wait until their processes are reaped.
    ///
    /// Sessions opened afterwards are terminated as soon as they start.
    pub async fn shutdown(&self) {
        info!(
            target: "pkgstore.session",
            active = self.drivers.len(),
            "Shutting down stream sessions"
        );
        self.shutdown.cancel();
        self.drivers.close();
        self.drivers.wait().await;
    }

    /// Validate raw input and open a session.
    pub fn open_raw(&self, action: &str, package: &str) -> Result<EventStream, CoreError> {
        let request = StreamRequest::parse(action, package)?;
        self.open(request)
    }

    /// Spawn the package manager and start streaming its progress.
    ///
    /// Fails without emitting anything if the package is already claimed
    /// by another session or the command cannot be spawned. Must be called
    /// from within a tokio runtime.
    pub fn open(&self, request: StreamRequest) -> Result<EventStream, CoreError> {
        let lease = self
            .registry
            .as_ref()
            .map(|registry| registry.try_acquire(&request.package))
            .transpose()?;

        let spec = self
            .settings
            .operation_command(request.action, &request.package);
        let running = self.runner.spawn(&spec)?;

        info!(
            target: "pkgstore.session",
            action = %request.action,
            package = %request.package,
            pid = ?running.handle.id(),
            command = %spec.display(),
            "Stream session started"
        );

        let (sender, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let driver = SessionDriver {
            session: StreamSession::new(request),
            events: sender,
            timer_interval: self.settings.timer_interval(),
            shutdown: self.shutdown.clone(),
            _lease: lease,
        };
        self.drivers.spawn(driver.run(running));

        Ok(EventStream { receiver })
    }
}

/// Consumer went away or the controller is shutting down; stop emitting.
enum Disconnected {
    Client,
    Shutdown,
}

enum Step {
    Output(Option<OutputChunk>),
    Exited(Result<ExitOutcome, ProcessError>),
    DrainExpired,
    Tick,
    Disconnected(Disconnected),
}

enum Finish {
    Exited(Result<ExitOutcome, ProcessError>),
    Disconnected(Disconnected),
}

struct SessionDriver {
    session: StreamSession,
    events: mpsc::Sender<StreamEvent>,
    timer_interval: Duration,
    shutdown: CancellationToken,
    _lease: Option<SessionLease>,
}

impl SessionDriver {
    async fn run(mut self, running: RunningCommand) {
        let RunningCommand {
            mut output,
            mut handle,
        } = running;

        let finish = match self.pump(&mut output, &mut *handle).await {
            Ok(finish) => finish,
            Err(reason) => Finish::Disconnected(reason),
        };

        match finish {
            Finish::Exited(result) => {
                let outcome = result.unwrap_or_else(|e| {
                    warn!(
                        target: "pkgstore.session",
                        package = %self.session.package,
                        error = %e,
                        "Lost track of package manager exit status"
                    );
                    ExitOutcome::signalled()
                });
                let total_seconds = self.session.elapsed_seconds();
                info!(
                    target: "pkgstore.session",
                    action = %self.session.action,
                    package = %self.session.package,
                    exit_code = outcome.code,
                    total_seconds,
                    "Stream session finished"
                );
                // A client leaving right now changes nothing; the process is gone.
                let _ = self
                    .emit(StreamEvent::done(outcome.code, total_seconds))
                    .await;
            }
            Finish::Disconnected(reason) => {
                let message = match reason {
                    Disconnected::Client => "Client disconnected, terminating package manager",
                    Disconnected::Shutdown => "Shutting down, terminating package manager",
                };
                info!(
                    target: "pkgstore.session",
                    package = %self.session.package,
                    elapsed_seconds = self.session.elapsed_seconds(),
                    "{message}"
                );
                match handle.terminate().await {
                    Ok(outcome) => debug!(
                        target: "pkgstore.session",
                        exit_code = outcome.code,
                        "Package manager terminated"
                    ),
                    Err(e) => warn!(
                        target: "pkgstore.session",
                        package = %self.session.package,
                        error = %e,
                        "Failed to terminate package manager"
                    ),
                }
            }
        }
    }

    async fn pump(
        &mut self,
        output: &mut mpsc::Receiver<OutputChunk>,
        handle: &mut (dyn ProcessHandle + 'static),
    ) -> Result<Finish, Disconnected> {
        self.emit(self.session.meta_event()).await?;
        self.emit(StreamEvent::stage(self.session.stage)).await?;

        let mut ticker = time::interval_at(
            self.session.started + self.timer_interval,
            self.timer_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let drain = time::sleep(Duration::ZERO);
        tokio::pin!(drain);

        let mut output_open = true;
        let mut exit: Option<Result<ExitOutcome, ProcessError>> = None;

        loop {
            if !output_open {
                if let Some(result) = exit.take() {
                    return Ok(Finish::Exited(result));
                }
            }

            let step = tokio::select! {
                () = self.events.closed() => Step::Disconnected(Disconnected::Client),
                () = self.shutdown.cancelled() => Step::Disconnected(Disconnected::Shutdown),
                chunk = output.recv(), if output_open => Step::Output(chunk),
                result = handle.wait(), if exit.is_none() => Step::Exited(result),
                () = &mut drain, if exit.is_some() => Step::DrainExpired,
                _ = ticker.tick() => Step::Tick,
            };

            match step {
                Step::Output(Some(chunk)) => self.forward(chunk).await?,
                Step::Output(None) => output_open = false,
                Step::Exited(result) => {
                    exit = Some(result);
                    drain.as_mut().reset(Instant::now() + OUTPUT_DRAIN_GRACE);
                }
                Step::DrainExpired => {
                    debug!(
                        target: "pkgstore.session",
                        package = %self.session.package,
                        "Output still open after exit, closing stream"
                    );
                    if let Some(result) = exit.take() {
                        return Ok(Finish::Exited(result));
                    }
                }
                Step::Tick => {
                    let elapsed = self.session.elapsed_seconds();
                    self.emit(StreamEvent::timer(elapsed)).await?;
                }
                Step::Disconnected(reason) => return Err(reason),
            }
        }
    }

    /// Log every chunk; only stdout feeds the stage classifier.
    async fn forward(&mut self, chunk: OutputChunk) -> Result<(), Disconnected> {
        debug!(
            target: "pkgstore.session",
            package = %self.session.package,
            stream = chunk.stream.as_str(),
            bytes = chunk.text.len(),
            "Process output"
        );

        let stage = match chunk.stream {
            OutputStream::Stdout => classify(&chunk.text),
            OutputStream::Stderr => None,
        };

        self.emit(StreamEvent::log(chunk.text)).await?;

        if let Some(stage) = stage {
            self.session.stage = stage;
            self.emit(StreamEvent::stage(stage)).await?;
        }
        Ok(())
    }

    async fn emit(&self, event: StreamEvent) -> Result<(), Disconnected> {
        tokio::select! {
            biased;
            sent = self.events.send(event) => sent.map_err(|_| Disconnected::Client),
            () = self.shutdown.cancelled() => Err(Disconnected::Shutdown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_validates_package_before_action() {
        assert_eq!(
            StreamRequest::parse("explode", "rm -rf /"),
            Err(ValidationError::InvalidPackage("rm -rf /".to_string()))
        );
        assert_eq!(
            StreamRequest::parse("explode", "htop"),
            Err(ValidationError::InvalidAction("explode".to_string()))
        );
    }

    #[test]
    fn request_accepts_valid_input() {
        let request = StreamRequest::parse("remove", "openjdk-21").unwrap();
        assert_eq!(request.action, PackageAction::Remove);
        assert_eq!(request.package.as_str(), "openjdk-21");
    }

    #[tokio::test]
    async fn new_session_starts_in_starting_stage() {
        let session = StreamSession::new(StreamRequest::parse("install", "htop").unwrap());
        assert_eq!(session.stage(), Stage::Starting);
        assert_eq!(session.elapsed_seconds(), 0);
        assert_eq!(session.meta_event().name(), "meta");
    }

    #[tokio::test]
    async fn start_time_is_whole_milliseconds() {
        let session = StreamSession::new(StreamRequest::parse("install", "htop").unwrap());
        assert_eq!(session.started_at().timestamp_subsec_nanos() % 1_000_000, 0);

        let event = session.meta_event();
        let decoded = crate::events::WireFrame::encode(&event)
            .unwrap()
            .decode()
            .unwrap();
        assert_eq!(decoded, event);
    }
}
