//! One-shot command execution for catalog queries.

use std::process::Stdio;

use pkgstore_core::{CommandSpec, CoreError};
use tokio::process::Command;
use tracing::{debug, warn};

/// Run `spec` to completion and return its stdout, decoded lossily.
///
/// A non-zero exit is logged, not an error: `pkg list-installed` and
/// `apt-cache pkgnames` print useful output even when they complain.
/// Failing to start the program is an error.
pub async fn capture_stdout(spec: &CommandSpec) -> Result<String, CoreError> {
    let output = Command::new(&spec.program)
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            CoreError::ExternalService(format!("failed to run `{}`: {e}", spec.display()))
        })?;

    if output.status.success() {
        debug!(command = %spec.display(), bytes = output.stdout.len(), "catalog command finished");
    } else {
        warn!(
            command = %spec.display(),
            status = %output.status,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "catalog command exited with failure"
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout() {
        let spec = CommandSpec::shell("sh", "-c", "printf 'htop\\nvim\\n'");
        assert_eq!(capture_stdout(&spec).await.unwrap(), "htop\nvim\n");
    }

    #[tokio::test]
    async fn failing_command_still_returns_output() {
        let spec = CommandSpec::shell("sh", "-c", "echo partial; echo oops >&2; exit 3");
        assert_eq!(capture_stdout(&spec).await.unwrap(), "partial\n");
    }

    #[tokio::test]
    async fn missing_program_is_external_service_error() {
        let spec = CommandSpec::new("/nonexistent/pkgstore-no-such-binary");
        let err = capture_stdout(&spec).await.unwrap_err();
        assert!(matches!(err, CoreError::ExternalService(_)));
    }
}
