use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};

/// Shared cancellation flag checked by the session loop.
///
/// Signal handlers only flip the flag; the loop notices it within one poll
/// interval and runs the shutdown protocol itself.
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route SIGINT, SIGTERM and SIGHUP to this token.
    ///
    /// The default disposition is replaced, so Ctrl-C no longer kills the
    /// orchestrator outright and the child is never orphaned.
    pub fn register_signals(&self) -> io::Result<()> {
        for signal in [SIGINT, SIGTERM, SIGHUP] {
            signal_hook::flag::register(signal, Arc::clone(&self.cancelled))?;
        }
        Ok(())
    }

    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            tracing::info!("cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
