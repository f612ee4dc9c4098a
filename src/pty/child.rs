use portable_pty::{Child, SlavePty};
use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crate::clock::deadline;

use super::error::PtyError;
use super::spawn_config::SpawnConfig;

const WAIT_STEP: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    Exited { code: u32 },
}

impl ProcessStatus {
    pub fn has_exited(self) -> bool {
        matches!(self, Self::Exited { .. })
    }
}

/// Liveness and signalling for the driven program.
pub trait Process {
    fn id(&self) -> Option<u32>;

    /// Non-blocking liveness check.
    fn poll(&mut self) -> io::Result<ProcessStatus>;

    /// Graceful stop (SIGTERM to the process group).
    fn terminate(&mut self) -> io::Result<()>;

    /// Forceful stop (SIGKILL to the process group).
    fn kill(&mut self) -> io::Result<()>;

    /// Block up to `timeout` for the process to exit.
    fn wait_timeout(&mut self, timeout: Duration) -> io::Result<ProcessStatus> {
        let due = deadline(Instant::now(), timeout);
        loop {
            let status = self.poll()?;
            let now = Instant::now();
            if status.has_exited() || now >= due {
                return Ok(status);
            }
            thread::sleep(WAIT_STEP.min(due - now));
        }
    }
}

/// How the shutdown protocol ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Nothing to do, the child was gone.
    AlreadyExited,
    /// Exited within the grace period after SIGTERM.
    Terminated,
    /// Needed SIGKILL.
    Killed,
}

/// Terminate, wait up to `grace`, then kill.
///
/// Runs on every exit path of a session. Errors are logged rather than
/// returned: there is no caller that could do anything more useful than
/// escalate, which this already does.
pub fn shutdown<P: Process + ?Sized>(process: &mut P, grace: Duration) -> ShutdownOutcome {
    match process.poll() {
        Ok(ProcessStatus::Exited { code }) => {
            tracing::debug!(code, "child already exited");
            return ShutdownOutcome::AlreadyExited;
        }
        Ok(ProcessStatus::Running) => {}
        Err(e) => tracing::warn!(error = %e, "failed to poll child before shutdown"),
    }

    tracing::info!(pid = ?process.id(), "terminating child");
    if let Err(e) = process.terminate() {
        tracing::warn!(error = %e, "SIGTERM failed");
    }
    match process.wait_timeout(grace) {
        Ok(ProcessStatus::Exited { code }) => {
            tracing::info!(code, "child exited after SIGTERM");
            return ShutdownOutcome::Terminated;
        }
        Ok(ProcessStatus::Running) => {}
        Err(e) => tracing::warn!(error = %e, "failed waiting for child"),
    }

    tracing::warn!(pid = ?process.id(), grace_ms = grace.as_millis() as u64, "child ignored SIGTERM, killing");
    if let Err(e) = process.kill() {
        tracing::error!(error = %e, "SIGKILL failed");
    }
    match process.wait_timeout(grace) {
        Ok(ProcessStatus::Exited { code }) => tracing::info!(code, "child killed"),
        Ok(ProcessStatus::Running) => tracing::error!("child still running after SIGKILL"),
        Err(e) => tracing::warn!(error = %e, "failed reaping killed child"),
    }
    ShutdownOutcome::Killed
}

/// A child process attached to the dependent side of a pseudo-terminal.
pub struct ChildHandle {
    child: Box<dyn Child + Send + Sync>,
    pid: Option<u32>,
    exit_code: Option<u32>,
}

impl ChildHandle {
    /// Spawn `config` with stdin/stdout/stderr bound to `slave`.
    ///
    /// portable-pty starts the child with `setsid()`, so it leads a new
    /// session and process group and can be signalled as a unit. The
    /// dependent side is dropped here, after the child inherited it;
    /// keeping it open in the parent would hide the child's hang-up.
    pub fn spawn(config: &SpawnConfig, slave: Box<dyn SlavePty + Send>) -> Result<Self, PtyError> {
        let cmd = config.command_builder()?;
        let child = slave
            .spawn_command(cmd)
            .map_err(|e| PtyError::Spawn {
                command: config.command().to_string(),
                message: e.to_string(),
            })?;
        drop(slave);

        let pid = child.process_id();
        tracing::info!(command = config.command(), pid = ?pid, "child spawned");
        Ok(Self {
            child,
            pid,
            exit_code: None,
        })
    }

    fn signal_group(&mut self, signal: libc::c_int) -> io::Result<()> {
        let Some(pid) = self.pid else {
            return self.child.kill();
        };
        if unsafe { libc::killpg(pid as libc::pid_t, signal) } == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            return Ok(());
        }
        Err(err)
    }
}

impl Process for ChildHandle {
    fn id(&self) -> Option<u32> {
        self.pid
    }

    fn poll(&mut self) -> io::Result<ProcessStatus> {
        if let Some(code) = self.exit_code {
            return Ok(ProcessStatus::Exited { code });
        }
        match self.child.try_wait()? {
            Some(status) => {
                let code = status.exit_code();
                self.exit_code = Some(code);
                Ok(ProcessStatus::Exited { code })
            }
            None => Ok(ProcessStatus::Running),
        }
    }

    fn terminate(&mut self) -> io::Result<()> {
        self.signal_group(libc::SIGTERM)
    }

    fn kill(&mut self) -> io::Result<()> {
        if let Err(e) = self.signal_group(libc::SIGKILL) {
            tracing::warn!(error = %e, "killpg failed, killing child directly");
            return self.child.kill();
        }
        Ok(())
    }
}
