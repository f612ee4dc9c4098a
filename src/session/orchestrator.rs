//! The session event loop.

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use scopeguard::ScopeGuard;

use crate::clock::deadline;
use crate::pty::{
    shutdown, Launcher, Process, ProcessStatus, ReadOutcome, ShutdownOutcome, Terminal,
    Utf8Decoder,
};
use crate::shutdown::CancelToken;

use super::engine::{Action, Engine, EngineSettings};
use super::error::{FailureReason, SessionError};
use super::state::SessionPhase;

/// Upper bound on reads when draining output left behind by an exited child.
const MAX_DRAIN_READS: usize = 64;

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Longest the loop blocks waiting for output.
    pub poll_interval: Duration,
    pub read_chunk: usize,
    /// SIGTERM → SIGKILL escalation delay.
    pub shutdown_grace: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            read_chunk: 1024,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub phase: SessionPhase,
    pub failure: Option<FailureReason>,
    pub shutdown: ShutdownOutcome,
    /// Exit status of the child once shutdown completed.
    pub child_exit: Option<u32>,
    pub bytes_read: usize,
}

impl SessionReport {
    pub fn succeeded(&self) -> bool {
        self.phase == SessionPhase::Ended
    }

    /// Process exit code for the orchestrator binary.
    pub fn exit_code(&self) -> i32 {
        match self.phase {
            SessionPhase::Ended => 0,
            SessionPhase::Interrupted => 130,
            _ => 1,
        }
    }

    pub fn status_line(&self) -> String {
        match (self.phase, &self.failure) {
            (SessionPhase::Ended, _) => "session ended".to_string(),
            (SessionPhase::Interrupted, _) => "session interrupted".to_string(),
            (_, Some(reason)) => format!("session failed: {reason}"),
            (phase, None) => format!("session stopped in phase {phase}"),
        }
    }
}

/// One orchestration run: the engine plus exclusively owned I/O handles.
struct Session<T, P> {
    engine: Engine,
    terminal: T,
    child: P,
    decoder: Utf8Decoder,
    hung_up: bool,
    bytes_read: usize,
}

impl<T: Terminal, P: Process> Session<T, P> {
    fn shutdown(&mut self, grace: Duration) -> ShutdownOutcome {
        self.terminal.close();
        shutdown(&mut self.child, grace)
    }
}

/// Drives an interactive program from first output to its goodbye.
pub struct SessionOrchestrator<L, W> {
    launcher: L,
    engine_settings: EngineSettings,
    settings: OrchestratorSettings,
    cancel: CancelToken,
    echo: W,
}

impl<L: Launcher, W: Write> SessionOrchestrator<L, W> {
    pub fn new(
        launcher: L,
        engine_settings: EngineSettings,
        settings: OrchestratorSettings,
        cancel: CancelToken,
        echo: W,
    ) -> Self {
        Self {
            launcher,
            engine_settings,
            settings,
            cancel,
            echo,
        }
    }

    pub fn echo(&self) -> &W {
        &self.echo
    }

    /// Spawn the child and run until it says goodbye, exits, or the run is
    /// cancelled. The shutdown protocol runs on every path, including
    /// unwinding out of this call.
    pub fn run(&mut self, instruction: &str) -> Result<SessionReport, SessionError> {
        let span = tracing::info_span!("session", id = %uuid::Uuid::new_v4());
        let _enter = span.enter();

        let (terminal, child) = self.launcher.launch()?;
        let grace = self.settings.shutdown_grace;
        let mut session = scopeguard::guard(
            Session {
                engine: Engine::new(self.engine_settings.clone(), instruction),
                terminal,
                child,
                decoder: Utf8Decoder::new(),
                hung_up: false,
                bytes_read: 0,
            },
            move |mut session| {
                tracing::warn!("session unwound, running shutdown protocol");
                session.shutdown(grace);
            },
        );

        let failure = self.drive(&mut *session);

        let mut session = ScopeGuard::into_inner(session);
        let outcome = session.shutdown(grace);
        let child_exit = match session.child.poll() {
            Ok(ProcessStatus::Exited { code }) => Some(code),
            _ => None,
        };
        let _ = self.echo.flush();

        let report = SessionReport {
            phase: session.engine.phase(),
            failure,
            shutdown: outcome,
            child_exit,
            bytes_read: session.bytes_read,
        };
        tracing::info!(phase = %report.phase, shutdown = ?report.shutdown, "session finished");
        Ok(report)
    }

    fn drive<T: Terminal, P: Process>(
        &mut self,
        session: &mut Session<T, P>,
    ) -> Option<FailureReason> {
        let mut buf = vec![0u8; self.settings.read_chunk.max(1)];

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!(phase = %session.engine.phase(), "cancellation received");
                session.engine.on_cancel();
                return None;
            }

            let actions = session.engine.tick(Instant::now());
            if let Err(reason) = self.execute(session, actions) {
                return Some(reason);
            }

            if session.hung_up {
                thread::sleep(self.settings.poll_interval);
            } else {
                match session.terminal.wait_readable(self.settings.poll_interval) {
                    Ok(true) => {
                        if let Err(reason) = self.read_once(session, &mut buf) {
                            return Some(reason);
                        }
                    }
                    Ok(false) => {}
                    Err(e) => return Some(fatal(session, "poll", e)),
                }
            }

            if session.engine.phase().is_terminal() {
                return None;
            }

            match session.child.poll() {
                Ok(ProcessStatus::Running) => {}
                Ok(ProcessStatus::Exited { code }) => {
                    if let Err(reason) = self.drain(session, &mut buf) {
                        return Some(reason);
                    }
                    if session.engine.phase() == SessionPhase::Ended {
                        return None;
                    }
                    tracing::warn!(code, phase = %session.engine.phase(), "child exited early");
                    session.engine.on_child_exit(Some(code));
                    return Some(FailureReason::ChildExited { code: Some(code) });
                }
                Err(e) => return Some(fatal(session, "wait", e)),
            }
        }
    }

    /// Read one chunk, echo it and feed it to the engine.
    fn read_once<T: Terminal, P: Process>(
        &mut self,
        session: &mut Session<T, P>,
        buf: &mut [u8],
    ) -> Result<bool, FailureReason> {
        match session.terminal.read(buf) {
            Ok(ReadOutcome::Data(n)) => {
                session.bytes_read += n;
                tracing::debug!(bytes = n, "read from child");
                self.echo_bytes(&buf[..n]);
                let text = session.decoder.decode(&buf[..n]);
                let actions = session.engine.on_output(&text, Instant::now());
                self.execute(session, actions)?;
                Ok(true)
            }
            Ok(ReadOutcome::WouldBlock) => Ok(false),
            Ok(ReadOutcome::Closed) => {
                if !session.hung_up {
                    tracing::debug!("terminal hung up");
                    session.hung_up = true;
                    let tail = session.decoder.finish();
                    if !tail.is_empty() {
                        let actions = session.engine.on_output(&tail, Instant::now());
                        self.execute(session, actions)?;
                    }
                }
                Ok(false)
            }
            Err(e) => Err(fatal(session, "read", e)),
        }
    }

    /// Consume whatever the child wrote before exiting; the goodbye phrase
    /// is often still in flight when the exit is noticed.
    fn drain<T: Terminal, P: Process>(
        &mut self,
        session: &mut Session<T, P>,
        buf: &mut [u8],
    ) -> Result<(), FailureReason> {
        for _ in 0..MAX_DRAIN_READS {
            if session.hung_up || session.engine.phase().is_terminal() {
                break;
            }
            match session.terminal.wait_readable(Duration::ZERO) {
                Ok(true) => {
                    if !self.read_once(session, buf)? {
                        break;
                    }
                }
                Ok(false) => break,
                Err(e) => return Err(fatal(session, "poll", e)),
            }
        }
        Ok(())
    }

    fn execute<T: Terminal, P: Process>(
        &mut self,
        session: &mut Session<T, P>,
        actions: Vec<Action>,
    ) -> Result<(), FailureReason> {
        for action in actions {
            match action {
                Action::Write { bytes, label } => {
                    tracing::info!(label = %label, bytes = bytes.len(), "writing to child");
                    if let Err(e) = session.terminal.write_all(&bytes) {
                        return Err(fatal(session, "write", e));
                    }
                }
                Action::Pause(duration) => {
                    if !self.pause(duration) {
                        // The loop top turns the cancellation into Interrupted.
                        tracing::info!("cancelled during pause, remaining actions dropped");
                        return Ok(());
                    }
                }
                Action::End => {
                    tracing::info!("goodbye observed");
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Sleep in poll-interval slices so cancellation stays responsive.
    /// Returns `false` if cancelled.
    fn pause(&self, duration: Duration) -> bool {
        let due = deadline(Instant::now(), duration);
        loop {
            if self.cancel.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= due {
                return true;
            }
            thread::sleep(self.settings.poll_interval.min(due - now));
        }
    }

    fn echo_bytes(&mut self, bytes: &[u8]) {
        if let Err(e) = self.echo.write_all(bytes).and_then(|_| self.echo.flush()) {
            tracing::debug!(error = %e, "echo failed");
        }
    }
}

fn fatal<T, P>(session: &mut Session<T, P>, op: &'static str, e: std::io::Error) -> FailureReason {
    tracing::error!(op, error = %e, "fatal terminal I/O error");
    session.engine.on_fatal_io();
    FailureReason::Io {
        op,
        message: e.to_string(),
    }
}
