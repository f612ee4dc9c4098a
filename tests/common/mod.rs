//! Shared test utilities and scripted terminal/process fakes.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use promptpilot::config::Config;
use promptpilot::pty::{Launcher, Process, ProcessStatus, PtyError, ReadOutcome, Terminal};
use promptpilot::session::{EngineSettings, OrchestratorSettings, SessionOrchestrator};
use promptpilot::shutdown::CancelToken;

/// One step of a scripted child.
#[derive(Debug, Clone)]
pub enum Event {
    /// Bytes the child prints.
    Output(Vec<u8>),
    /// The child exits with this code.
    Exit(u32),
    /// Someone hits Ctrl-C.
    Cancel,
    /// The next read fails with a non-transient error.
    ReadError,
    /// The next read panics.
    Panic,
}

pub fn out(text: &str) -> Event {
    Event::Output(text.as_bytes().to_vec())
}

/// State shared between the fake terminal, the fake child and the test.
pub struct World {
    events: VecDeque<Event>,
    cancel: CancelToken,
    pub writes: Vec<Vec<u8>>,
    pub running: bool,
    pub exit_code: Option<u32>,
    pub obeys_term: bool,
    pub terminated: bool,
    pub killed: bool,
    pub closed: bool,
    pub fail_writes: bool,
}

impl World {
    /// Apply control events sitting at the head of the script.
    fn advance(&mut self) {
        loop {
            match self.events.front() {
                Some(Event::Exit(code)) => {
                    self.running = false;
                    self.exit_code = Some(*code);
                }
                Some(Event::Cancel) => self.cancel.cancel(),
                _ => return,
            }
            self.events.pop_front();
        }
    }

    pub fn writes_as_strings(&self) -> Vec<String> {
        self.writes
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }
}

#[derive(Clone)]
pub struct Shared(Arc<Mutex<World>>);

impl Shared {
    pub fn new(events: Vec<Event>, cancel: CancelToken) -> Self {
        Self(Arc::new(Mutex::new(World {
            events: events.into(),
            cancel,
            writes: Vec::new(),
            running: true,
            exit_code: None,
            obeys_term: true,
            terminated: false,
            killed: false,
            closed: false,
            fail_writes: false,
        })))
    }

    /// Poison-tolerant: a scripted panic must not break the shutdown checks.
    pub fn lock(&self) -> MutexGuard<'_, World> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct FakeTerminal(Shared);

impl Terminal for FakeTerminal {
    fn wait_readable(&mut self, _timeout: Duration) -> io::Result<bool> {
        let mut world = self.0.lock();
        world.advance();
        Ok(match world.events.front() {
            Some(_) => true,
            None => !world.running,
        })
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        let mut world = self.0.lock();
        world.advance();
        match world.events.pop_front() {
            Some(Event::Output(bytes)) => {
                assert!(bytes.len() <= buf.len(), "scripted chunk larger than read buffer");
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok(ReadOutcome::Data(bytes.len()))
            }
            Some(Event::ReadError) => Err(io::Error::new(io::ErrorKind::Other, "boom")),
            Some(Event::Panic) => {
                drop(world);
                panic!("scripted panic");
            }
            Some(other) => unreachable!("control event {other:?} not advanced"),
            None if !world.running => Ok(ReadOutcome::Closed),
            None => Ok(ReadOutcome::WouldBlock),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut world = self.0.lock();
        if world.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "child gone"));
        }
        world.writes.push(bytes.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        self.0.lock().closed = true;
    }
}

pub struct FakeChild(Shared);

impl Process for FakeChild {
    fn id(&self) -> Option<u32> {
        Some(4242)
    }

    fn poll(&mut self) -> io::Result<ProcessStatus> {
        let mut world = self.0.lock();
        world.advance();
        Ok(match (world.running, world.exit_code) {
            (true, _) => ProcessStatus::Running,
            (false, code) => ProcessStatus::Exited {
                code: code.unwrap_or(0),
            },
        })
    }

    fn terminate(&mut self) -> io::Result<()> {
        let mut world = self.0.lock();
        world.terminated = true;
        if world.obeys_term && world.running {
            world.running = false;
            world.exit_code = Some(143);
        }
        Ok(())
    }

    fn kill(&mut self) -> io::Result<()> {
        let mut world = self.0.lock();
        world.killed = true;
        if world.running {
            world.running = false;
            world.exit_code = Some(137);
        }
        Ok(())
    }
}

pub struct FakeLauncher {
    shared: Shared,
    pub fail: bool,
}

impl FakeLauncher {
    pub fn new(shared: Shared) -> Self {
        Self {
            shared,
            fail: false,
        }
    }
}

impl Launcher for FakeLauncher {
    type Terminal = FakeTerminal;
    type Process = FakeChild;

    fn launch(&mut self) -> Result<(FakeTerminal, FakeChild), PtyError> {
        if self.fail {
            return Err(PtyError::Spawn {
                command: "aider".to_string(),
                message: "No such file or directory".to_string(),
            });
        }
        Ok((
            FakeTerminal(self.shared.clone()),
            FakeChild(self.shared.clone()),
        ))
    }
}

/// Default protocol with every pacing delay removed.
pub fn fast_engine_settings() -> EngineSettings {
    let mut config = Config::default();
    config.session.settle_delay_ms = 0;
    config.session.bootstrap_pause_ms = 0;
    config.session.instruction_delay_ms = 0;
    config.engine_settings()
}

pub fn fast_orchestrator_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        poll_interval: Duration::from_millis(1),
        read_chunk: 1024,
        shutdown_grace: Duration::from_millis(50),
    }
}

/// Build an orchestrator over a scripted child.
///
/// Returns `(orchestrator, shared_world, cancel_token)`.
pub fn scripted(
    events: Vec<Event>,
) -> (
    SessionOrchestrator<FakeLauncher, Vec<u8>>,
    Shared,
    CancelToken,
) {
    let cancel = CancelToken::new();
    let shared = Shared::new(events, cancel.clone());
    let orchestrator = SessionOrchestrator::new(
        FakeLauncher::new(shared.clone()),
        fast_engine_settings(),
        fast_orchestrator_settings(),
        cancel.clone(),
        Vec::new(),
    );
    (orchestrator, shared, cancel)
}
