//! Pre-run environment preparation.
//!
//! Kept out of the session core: the caller runs this before constructing
//! an orchestrator.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// Truncate (creating if needed) each session-history file.
///
/// The driven program reads these on startup; clearing them gives every run
/// a clean transcript and input history.
pub fn reset_history<P: AsRef<Path>>(files: &[P], base: &Path) -> io::Result<Vec<PathBuf>> {
    let mut cleared = Vec::with_capacity(files.len());
    for file in files {
        let path = base.join(file.as_ref());
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "history file cleared");
        cleared.push(path);
    }
    Ok(cleared)
}
