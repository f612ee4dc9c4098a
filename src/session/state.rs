//! Phase of a single orchestration run.

use crate::mvi::State;

/// Flat session state machine.
///
/// ```text
/// Starting → Bootstrapping → AwaitingInstructionDispatch → Running → Ended
///     └────────────┴────────────────────┴───────────────────┴──→ Failed | Interrupted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Child spawned, no output seen yet.
    #[default]
    Starting,
    /// Fixed setup commands are being written.
    Bootstrapping,
    /// Setup done, user instruction not yet written.
    AwaitingInstructionDispatch,
    /// Instruction written; answering prompts until the goodbye phrase.
    Running,
    /// Goodbye phrase observed.
    Ended,
    /// Child exited early or the terminal failed.
    Failed,
    /// External cancellation.
    Interrupted,
}

impl State for SessionPhase {}

impl SessionPhase {
    /// Terminal phases are absorbing; the loop exits once one is reached.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Failed | Self::Interrupted)
    }

    /// Phases in which prompt rules are evaluated against the buffer.
    pub fn answers_prompts(self) -> bool {
        matches!(self, Self::AwaitingInstructionDispatch | Self::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Bootstrapping => "bootstrapping",
            Self::AwaitingInstructionDispatch => "awaiting-instruction-dispatch",
            Self::Running => "running",
            Self::Ended => "ended",
            Self::Failed => "failed",
            Self::Interrupted => "interrupted",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_starting() {
        assert_eq!(SessionPhase::default(), SessionPhase::Starting);
    }

    #[test]
    fn terminal_phases() {
        assert!(SessionPhase::Ended.is_terminal());
        assert!(SessionPhase::Failed.is_terminal());
        assert!(SessionPhase::Interrupted.is_terminal());
        assert!(!SessionPhase::Starting.is_terminal());
        assert!(!SessionPhase::Running.is_terminal());
    }

    #[test]
    fn prompts_only_answered_after_bootstrap() {
        assert!(!SessionPhase::Starting.answers_prompts());
        assert!(!SessionPhase::Bootstrapping.answers_prompts());
        assert!(SessionPhase::AwaitingInstructionDispatch.answers_prompts());
        assert!(SessionPhase::Running.answers_prompts());
        assert!(!SessionPhase::Ended.answers_prompts());
    }
}
