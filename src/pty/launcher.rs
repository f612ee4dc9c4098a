use super::child::{ChildHandle, Process};
use super::error::PtyError;
use super::handle::{PtyHandle, Terminal};
use super::spawn_config::SpawnConfig;

/// Produces the terminal/process pair for one session.
pub trait Launcher {
    type Terminal: Terminal;
    type Process: Process;

    fn launch(&mut self) -> Result<(Self::Terminal, Self::Process), PtyError>;
}

/// Launches the configured program on a real pseudo-terminal.
pub struct PtyLauncher {
    config: SpawnConfig,
}

impl PtyLauncher {
    pub fn new(config: SpawnConfig) -> Self {
        Self { config }
    }
}

impl Launcher for PtyLauncher {
    type Terminal = PtyHandle;
    type Process = ChildHandle;

    fn launch(&mut self) -> Result<(PtyHandle, ChildHandle), PtyError> {
        let (terminal, slave) = PtyHandle::open(self.config.pty_size())?;
        // Before spawning, so a failure here never leaves a child behind.
        terminal.set_non_blocking()?;
        let child = ChildHandle::spawn(&self.config, slave)?;
        Ok((terminal, child))
    }
}
