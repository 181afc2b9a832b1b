//! Stream command handler.
//!
//! Runs one install/remove session against the local package manager and
//! writes every event to stdout in SSE framing, exactly as `/api/stream`
//! would send it. Ctrl-C or SIGTERM stops the package manager before the
//! command exits.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use pkgstore_core::{
    CoreError, SessionController, StreamEvent, WireFrame, validate_settings,
};
use pkgstore_runtime::{ShellCommandRunner, shutdown_signal};
use tracing::{debug, warn};

use crate::config::StreamArgs;
use crate::error::CliError;

/// Execute the stream command and return the package manager's exit code.
pub async fn execute(args: StreamArgs) -> Result<i32, CliError> {
    let settings = args.store.into_settings();
    validate_settings(&settings).map_err(CoreError::from)?;

    let runner = Arc::new(ShellCommandRunner::new(settings.shutdown_grace()));
    let controller = SessionController::new(runner, Arc::new(settings));

    let mut stdout = std::io::stdout();
    run_until(
        &controller,
        &args.action,
        &args.package,
        &mut stdout,
        shutdown_signal(),
    )
    .await
}

/// Like [`run_session`], but stop early when `interrupt` resolves.
///
/// An interrupted session has its process group terminated and reaped
/// before this returns [`CliError::Interrupted`].
pub async fn run_until<W: Write + Send>(
    controller: &SessionController,
    action: &str,
    package: &str,
    out: &mut W,
    interrupt: impl Future<Output = ()>,
) -> Result<i32, CliError> {
    tokio::select! {
        result = run_session(controller, action, package, out) => result,
        () = interrupt => {
            warn!(package, "interrupted, stopping package manager");
            controller.shutdown().await;
            Err(CliError::Interrupted)
        }
    }
}

/// Open a session and copy its frames to `out` until `done`.
pub async fn run_session<W: Write + Send>(
    controller: &SessionController,
    action: &str,
    package: &str,
    out: &mut W,
) -> Result<i32, CliError> {
    let mut events = controller.open_raw(action, package.trim())?;
    let mut exit_code = None;

    while let Some(event) = events.recv().await {
        let frame = WireFrame::encode(&event)?;
        out.write_all(frame.to_text().as_bytes())?;
        out.flush()?;

        if let StreamEvent::Done {
            exit_code: code, ..
        } = event
        {
            exit_code = Some(code);
        }
    }

    debug!(?exit_code, "stream finished");
    exit_code.ok_or_else(|| CliError::Core("session ended without a done event".to_string()))
}

/// Turn a package-manager exit code into this process's exit status.
///
/// Signal terminations have no status of their own and become 1.
pub fn process_exit_status(code: i32) -> i32 {
    if (0..=255).contains(&code) { code } else { 1 }
}
