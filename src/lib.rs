//! Scripted driver for interactive command-line programs.
//!
//! Attaches to a program through a pseudo-terminal, watches its output for
//! known prompts and answers them, so a multi-step interactive session can
//! run to completion unattended.

pub mod cli;
mod clock;
pub mod config;
pub mod logging;
pub mod mvi;
pub mod pty;
pub mod session;
pub mod setup;
pub mod shutdown;
