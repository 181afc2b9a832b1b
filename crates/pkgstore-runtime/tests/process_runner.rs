//! Real-process tests for the shell runner and a full session on top of it.

#![cfg(unix)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use pkgstore_core::{
    CommandRunner, CommandSpec, OutputChunk, OutputStream, SessionController, Stage,
    StoreSettings, StreamEvent,
};
use pkgstore_runtime::ShellCommandRunner;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_test::assert_ok;

fn sh(script: &str) -> CommandSpec {
    CommandSpec::shell("sh", "-c", script)
}

async fn drain(mut output: mpsc::Receiver<OutputChunk>) -> (String, String) {
    let (mut stdout, mut stderr) = (String::new(), String::new());
    while let Some(chunk) = output.recv().await {
        match chunk.stream {
            OutputStream::Stdout => stdout.push_str(&chunk.text),
            OutputStream::Stderr => stderr.push_str(&chunk.text),
        }
    }
    (stdout, stderr)
}

fn sh_settings(package_manager: &str) -> StoreSettings {
    StoreSettings {
        shell: "sh".to_string(),
        shell_flag: "-c".to_string(),
        package_manager: package_manager.to_string(),
        auto_confirm: false,
        timer_interval_ms: 100,
        ..StoreSettings::default()
    }
}

#[tokio::test]
async fn captures_both_pipes_and_exit_code() {
    let runner = ShellCommandRunner::default();
    let mut running = assert_ok!(runner.spawn(&sh("echo out; echo err >&2; exit 3")));

    let (stdout, stderr) = drain(running.output).await;
    assert_eq!(stdout, "out\n");
    assert_eq!(stderr, "err\n");

    let outcome = assert_ok!(running.handle.wait().await);
    assert_eq!(outcome.code, 3);
    assert!(!outcome.success());
}

#[tokio::test]
async fn missing_shell_fails_to_spawn() {
    let runner = ShellCommandRunner::default();
    let err = runner
        .spawn(&CommandSpec::new("/nonexistent/pkgstore-shell"))
        .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/pkgstore-shell"));
}

#[tokio::test]
async fn terminate_stops_the_whole_process_group() {
    let runner = ShellCommandRunner::new(Duration::from_secs(2));
    // The background sleep inherits stdout, so the pipe only closes once
    // the grandchild is gone too.
    let mut running = assert_ok!(runner.spawn(&sh("sleep 30 & echo started; wait")));

    let first = timeout(Duration::from_secs(5), running.output.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, OutputChunk::stdout("started\n"));

    let started = Instant::now();
    let outcome = assert_ok!(running.handle.terminate().await);
    assert!(!outcome.success());
    assert!(started.elapsed() < Duration::from_secs(5));

    let closed = timeout(Duration::from_secs(5), running.output.recv()).await;
    assert_eq!(closed.unwrap(), None);
}

#[tokio::test]
async fn session_over_real_process_reaches_done() {
    let runner = Arc::new(ShellCommandRunner::default());
    let controller = SessionController::new(runner, Arc::new(sh_settings("echo Unpacking")));

    let mut stream = assert_ok!(controller.open_raw("install", "htop"));
    let mut events = Vec::new();
    while let Some(event) = timeout(Duration::from_secs(10), stream.recv()).await.unwrap() {
        events.push(event);
    }

    assert_eq!(events[0].name(), "meta");
    assert!(events.contains(&StreamEvent::log("Unpacking install htop\n")));
    assert!(events.contains(&StreamEvent::stage(Stage::Installing)));
    assert!(matches!(
        events.last(),
        Some(StreamEvent::Done {
            ok: true,
            exit_code: 0,
            ..
        })
    ));
}

#[tokio::test]
async fn failing_package_manager_reports_exit_code() {
    let runner = Arc::new(ShellCommandRunner::default());
    let controller = SessionController::new(runner, Arc::new(sh_settings("exit 100;")));

    let mut stream = assert_ok!(controller.open_raw("remove", "vim"));
    let mut last = None;
    while let Some(event) = timeout(Duration::from_secs(10), stream.recv()).await.unwrap() {
        last = Some(event);
    }

    assert!(matches!(
        last,
        Some(StreamEvent::Done {
            ok: false,
            exit_code: 100,
            ..
        })
    ));
}

#[tokio::test]
async fn dropping_handle_releases_pipes_held_by_leftovers() {
    let runner = ShellCommandRunner::default();
    // The shell exits at once; the background sleep keeps stdout open.
    let mut running = assert_ok!(runner.spawn(&sh("sleep 10 & echo started")));

    let outcome = assert_ok!(
        timeout(Duration::from_secs(5), running.handle.wait())
            .await
            .unwrap()
    );
    assert_eq!(outcome.code, 0);

    let first = timeout(Duration::from_secs(5), running.output.recv())
        .await
        .unwrap();
    assert_eq!(first, Some(OutputChunk::stdout("started\n")));
    assert!(
        timeout(Duration::from_millis(200), running.output.recv())
            .await
            .is_err()
    );

    drop(running.handle);
    let closed = timeout(Duration::from_secs(5), running.output.recv()).await;
    assert_eq!(closed.unwrap(), None);
}

#[tokio::test]
async fn session_finishes_while_a_daemon_holds_stdout() {
    let runner = Arc::new(ShellCommandRunner::default());
    let controller =
        SessionController::new(runner, Arc::new(sh_settings("sleep 10 & echo Setting up")));

    let mut stream = assert_ok!(controller.open_raw("install", "termux-services"));
    let mut last = None;
    while let Some(event) = timeout(Duration::from_secs(10), stream.recv()).await.unwrap() {
        last = Some(event);
    }

    assert!(matches!(last, Some(StreamEvent::Done { ok: true, .. })));
    timeout(Duration::from_secs(5), async {
        while controller.active_sessions() > 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn controller_shutdown_stops_real_process() {
    let runner = Arc::new(ShellCommandRunner::new(Duration::from_secs(2)));
    let controller = SessionController::new(runner, Arc::new(sh_settings("sleep 30;")));

    let mut stream = assert_ok!(controller.open_raw("install", "htop"));
    let first = timeout(Duration::from_secs(5), stream.recv()).await.unwrap();
    assert_eq!(first.map(|e| e.name()), Some("meta"));

    let started = Instant::now();
    timeout(Duration::from_secs(10), controller.shutdown())
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(controller.active_sessions(), 0);

    while let Some(event) = timeout(Duration::from_secs(5), stream.recv()).await.unwrap() {
        assert!(!event.is_terminal());
    }
}
