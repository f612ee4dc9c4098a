//! Events that move the session between phases.

use crate::mvi::Intent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionIntent {
    /// First non-empty read from the child.
    FirstOutput,
    /// Every bootstrap command has been written.
    BootstrapWritten,
    /// The user instruction has been written.
    InstructionWritten,
    /// The goodbye phrase appeared in the buffer.
    GoodbyeObserved,
    /// The child is no longer running.
    ChildExited { code: Option<u32> },
    /// Read or write on the controller side failed.
    FatalIo,
    /// SIGINT/SIGTERM/SIGHUP or a programmatic cancel.
    Cancelled,
}

impl Intent for SessionIntent {}
