//! Graceful shutdown for a package-manager process group.
//!
//! The package manager runs as `bash -lc "yes | pkg install …"`, so the
//! interesting processes (`pkg`, `apt`, `dpkg`, `yes`) are grandchildren of
//! the child we hold. The child is spawned as a process-group leader and
//! the whole group is signalled.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;

#[cfg(unix)]
use tokio::time::timeout;

#[cfg(unix)]
use nix::sys::signal::{Signal, killpg};
#[cfg(unix)]
use nix::unistd::Pid;

/// Shut down a child and its process group, escalating to SIGKILL if needed.
///
/// # Strategy
/// 1. Send SIGTERM to the group and wait up to `grace` for the child to exit
/// 2. If still running, send SIGKILL to the group
/// 3. Wait for the child to be reaped (required to avoid zombies)
///
/// # Platform behavior
/// - Unix: signals the whole process group via `killpg`
/// - Elsewhere: immediately calls `.kill()` on the child
pub async fn shutdown_child(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        shutdown_unix(child, grace).await
    }

    #[cfg(not(unix))]
    {
        let _ = grace;
        child.kill().await?;
        child.wait().await
    }
}

#[cfg(unix)]
async fn shutdown_unix(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    // `id()` is None once the child has been reaped.
    let Some(pid) = child.id() else {
        return child.wait().await;
    };
    let group = Pid::from_raw(
        i32::try_from(pid).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?,
    );

    // Phase 1: SIGTERM with grace period
    if let Err(e) = killpg(group, Signal::SIGTERM) {
        // Group may have already exited
        if e == nix::errno::Errno::ESRCH {
            return child.wait().await;
        }
        return Err(io::Error::other(e));
    }

    if let Ok(result) = timeout(grace, child.wait()).await {
        // Leader is gone; make sure stragglers in the group are too.
        let _ = killpg(group, Signal::SIGKILL);
        return result;
    }

    // Phase 2: SIGKILL the group, then the child itself in case it left it.
    match killpg(group, Signal::SIGKILL) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
        Err(e) => return Err(io::Error::other(e)),
    }
    child.start_kill().ok();

    // Phase 3: Wait for reaping (should be fast after SIGKILL)
    child.wait().await
}
