//! Pseudo-terminal attachment and child process lifecycle.
//!
//! The session loop only talks to the [`Terminal`] and [`Process`] traits;
//! the portable-pty backed implementations live here so the loop can be
//! exercised against scripted fakes.

mod child;
mod error;
mod handle;
mod launcher;
mod spawn_config;
mod utf8;

pub use child::{shutdown, ChildHandle, Process, ProcessStatus, ShutdownOutcome};
pub use error::PtyError;
pub use handle::{PtyHandle, ReadOutcome, Terminal};
pub use launcher::{Launcher, PtyLauncher};
pub use spawn_config::SpawnConfig;
pub use utf8::Utf8Decoder;
