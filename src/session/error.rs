use std::fmt;
use thiserror::Error;

use crate::pty::PtyError;

/// Errors that prevent a session from starting at all.
///
/// Once the child is running, failures are reported through
/// [`SessionReport`](super::SessionReport) instead, after the shutdown
/// protocol has run.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to launch child: {0}")]
    Launch(#[from] PtyError),
}

/// Why a session ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Child exited before the goodbye phrase.
    ChildExited { code: Option<u32> },
    /// Read, write or readiness wait on the terminal failed.
    Io { op: &'static str, message: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ChildExited { code: Some(code) } => {
                write!(f, "child exited with code {code} before saying goodbye")
            }
            FailureReason::ChildExited { code: None } => {
                write!(f, "child exited before saying goodbye")
            }
            FailureReason::Io { op, message } => write!(f, "terminal {op} failed: {message}"),
        }
    }
}
