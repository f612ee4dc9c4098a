//! End-to-end runs against `/bin/sh` on a real pseudo-terminal.
#![cfg(unix)]

mod common;

use std::thread;
use std::time::{Duration, Instant};

use promptpilot::pty::{PtyLauncher, ShutdownOutcome, SpawnConfig};
use promptpilot::session::{FailureReason, SessionError, SessionOrchestrator, SessionPhase};
use promptpilot::shutdown::CancelToken;

const AIDER_LIKE: &str = r#"printf 'Welcome\n'
read a
read b
read instr
printf 'got=%s\n' "$instr"
printf 'Ready (Y)es/(N)o '
read ans
printf 'answer=%s\n' "$ans"
printf 'Goodbye!\n'
sleep 30"#;

fn sh(script: &str) -> PtyLauncher {
    PtyLauncher::new(SpawnConfig::new(
        "/bin/sh",
        vec!["-c".to_string(), script.to_string()],
    ))
}

fn orchestrator(
    launcher: PtyLauncher,
    cancel: CancelToken,
) -> SessionOrchestrator<PtyLauncher, Vec<u8>> {
    let mut settings = common::fast_orchestrator_settings();
    settings.poll_interval = Duration::from_millis(20);
    settings.shutdown_grace = Duration::from_secs(2);
    SessionOrchestrator::new(
        launcher,
        common::fast_engine_settings(),
        settings,
        cancel,
        Vec::new(),
    )
}

#[test]
fn scripted_shell_session_ends_cleanly() {
    let mut orchestrator = orchestrator(sh(AIDER_LIKE), CancelToken::new());
    let started = Instant::now();

    let report = orchestrator.run("plot the data").unwrap();

    assert_eq!(report.phase, SessionPhase::Ended, "{}", report.status_line());
    // The shell was still in `sleep 30`; the group SIGTERM stopped it.
    assert_eq!(report.shutdown, ShutdownOutcome::Terminated);
    assert!(started.elapsed() < Duration::from_secs(20));

    let echo = String::from_utf8_lossy(orchestrator.echo());
    assert!(echo.contains("got=plot the data"), "{echo}");
    assert!(echo.contains("answer=yes"), "{echo}");
}

#[test]
fn early_exit_reports_child_code() {
    let script = "printf 'Welcome\\n'; read a; read b; read c; exit 3";
    let mut orchestrator = orchestrator(sh(script), CancelToken::new());

    let report = orchestrator.run("x").unwrap();

    assert_eq!(report.phase, SessionPhase::Failed);
    assert_eq!(
        report.failure,
        Some(FailureReason::ChildExited { code: Some(3) })
    );
    assert_eq!(report.shutdown, ShutdownOutcome::AlreadyExited);
    assert_eq!(report.child_exit, Some(3));
}

#[test]
fn cancellation_stops_a_silent_child() {
    let cancel = CancelToken::new();
    let mut orchestrator = orchestrator(sh("sleep 30"), cancel.clone());

    let trigger = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        trigger.cancel();
    });
    let started = Instant::now();

    let report = orchestrator.run("x").unwrap();
    canceller.join().unwrap();

    assert_eq!(report.phase, SessionPhase::Interrupted);
    assert_eq!(report.exit_code(), 130);
    assert_ne!(report.shutdown, ShutdownOutcome::AlreadyExited);
    assert!(report.child_exit.is_some());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn missing_program_fails_to_launch() {
    let launcher = PtyLauncher::new(SpawnConfig::new(
        "/nonexistent/promptpilot-child",
        Vec::new(),
    ));
    let mut orchestrator = orchestrator(launcher, CancelToken::new());

    let err = orchestrator.run("x").unwrap_err();
    assert!(matches!(err, SessionError::Launch(_)));
}
