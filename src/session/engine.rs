//! Decision engine: turns decoded child output into actions.
//!
//! The engine owns the phase, the buffer and the one-shot bookkeeping, but no
//! I/O. The orchestrator feeds it chunks and executes the returned actions,
//! which keeps every transition testable against synthetic output.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::clock::deadline;
use crate::mvi::Reducer;

use super::buffer::SessionBuffer;
use super::intent::SessionIntent;
use super::reducer::SessionReducer;
use super::rules::{RuleOutcome, RuleTable};
use super::state::SessionPhase;

/// Something the orchestrator must do on the engine's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Write bytes to the controller side.
    Write { bytes: Vec<u8>, label: String },
    /// Sleep before the next action; the child drops input sent too fast.
    Pause(Duration),
    /// Stop reading and writing.
    End,
}

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    /// Setup commands, line endings already applied.
    pub bootstrap: Vec<Vec<u8>>,
    /// Wait after the first output before the first bootstrap command.
    pub settle_delay: Duration,
    /// Pause between consecutive bootstrap commands.
    pub bootstrap_pause: Duration,
    /// Wait after bootstrap before the instruction is written.
    pub instruction_delay: Duration,
    pub line_ending: String,
    pub rules: RuleTable,
}

pub struct Engine {
    settings: EngineSettings,
    instruction: Vec<u8>,
    /// Instruction text until the terminal has echoed it back.
    pending_echo: Option<String>,
    phase: SessionPhase,
    buffer: SessionBuffer,
    fired: HashSet<usize>,
    bootstrap_sent: bool,
    instruction_sent: bool,
    instruction_due: Option<Instant>,
}

impl Engine {
    pub fn new(settings: EngineSettings, instruction: &str) -> Self {
        let mut bytes = instruction.as_bytes().to_vec();
        bytes.extend_from_slice(settings.line_ending.as_bytes());
        let echo = instruction.trim();
        Self {
            settings,
            instruction: bytes,
            pending_echo: (!echo.is_empty()).then(|| echo.to_string()),
            phase: SessionPhase::default(),
            buffer: SessionBuffer::new(),
            fired: HashSet::new(),
            bootstrap_sent: false,
            instruction_sent: false,
            instruction_due: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn buffer(&self) -> &SessionBuffer {
        &self.buffer
    }

    pub fn instruction_sent(&self) -> bool {
        self.instruction_sent
    }

    fn dispatch(&mut self, intent: SessionIntent) {
        let before = self.phase;
        self.phase = SessionReducer::reduce(before, intent);
        if before != self.phase {
            tracing::info!(from = %before, to = %self.phase, "session phase changed");
        }
    }

    /// Handle one decoded chunk of child output.
    pub fn on_output(&mut self, text: &str, now: Instant) -> Vec<Action> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        if text.is_empty() {
            return self.tick(now);
        }

        if self.phase == SessionPhase::Starting {
            self.dispatch(SessionIntent::FirstOutput);
            return self.bootstrap(now);
        }

        // Dispatch first so text from this read lands after the reset.
        let mut actions = self.tick(now);
        self.buffer.append(text);
        if self.instruction_sent {
            self.skip_instruction_echo();
        }
        if !self.phase.answers_prompts() {
            return actions;
        }

        if let Some(hit) = self
            .settings
            .rules
            .evaluate(&self.buffer, self.phase, &self.fired)
        {
            tracing::info!(rule = %hit.name, "prompt rule fired");
            self.fired.insert(hit.index);
            match hit.outcome {
                RuleOutcome::End => {
                    self.dispatch(SessionIntent::GoodbyeObserved);
                    actions.push(Action::End);
                }
                RuleOutcome::Write(bytes) => {
                    actions.push(Action::Write {
                        bytes,
                        label: hit.name,
                    });
                }
            }
            if hit.reset_buffer {
                self.buffer.reset();
            }
        }

        actions
    }

    /// Time-driven work: dispatch the instruction once its delay has passed.
    pub fn tick(&mut self, now: Instant) -> Vec<Action> {
        if self.phase != SessionPhase::AwaitingInstructionDispatch || self.instruction_sent {
            return Vec::new();
        }
        match self.instruction_due {
            Some(due) if now < due => return Vec::new(),
            _ => {}
        }

        self.instruction_sent = true;
        // Text seen before the instruction never answers anything after it.
        self.buffer.reset();
        self.dispatch(SessionIntent::InstructionWritten);
        vec![Action::Write {
            bytes: self.instruction.clone(),
            label: "instruction".to_string(),
        }]
    }

    /// The terminal echoes the instruction back; its words must not count
    /// as prompt triggers or negative markers.
    fn skip_instruction_echo(&mut self) {
        if let Some(echo) = &self.pending_echo {
            if self.buffer.discard_through(echo) {
                tracing::debug!("instruction echo skipped");
                self.pending_echo = None;
            }
        }
    }

    fn bootstrap(&mut self, now: Instant) -> Vec<Action> {
        if self.bootstrap_sent {
            return Vec::new();
        }
        self.bootstrap_sent = true;

        let mut actions = Vec::with_capacity(self.settings.bootstrap.len() * 2 + 1);
        let mut elapsed = Duration::ZERO;
        if !self.settings.settle_delay.is_zero() {
            actions.push(Action::Pause(self.settings.settle_delay));
            elapsed = elapsed.saturating_add(self.settings.settle_delay);
        }
        for (i, command) in self.settings.bootstrap.iter().enumerate() {
            if i > 0 && !self.settings.bootstrap_pause.is_zero() {
                actions.push(Action::Pause(self.settings.bootstrap_pause));
                elapsed = elapsed.saturating_add(self.settings.bootstrap_pause);
            }
            actions.push(Action::Write {
                bytes: command.clone(),
                label: "bootstrap".to_string(),
            });
        }

        self.buffer.reset();
        self.dispatch(SessionIntent::BootstrapWritten);
        self.instruction_due = Some(deadline(
            now,
            elapsed.saturating_add(self.settings.instruction_delay),
        ));
        actions
    }

    pub fn on_child_exit(&mut self, code: Option<u32>) {
        self.dispatch(SessionIntent::ChildExited { code });
    }

    pub fn on_fatal_io(&mut self) {
        self.dispatch(SessionIntent::FatalIo);
    }

    pub fn on_cancel(&mut self) {
        self.dispatch(SessionIntent::Cancelled);
    }
}
