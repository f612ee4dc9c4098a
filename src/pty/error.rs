use thiserror::Error;

/// Errors from opening the pseudo-terminal or spawning the child.
#[derive(Debug, Error)]
pub enum PtyError {
    #[error("failed to open pseudo-terminal: {0}")]
    Open(String),

    #[error("failed to spawn '{command}': {message}")]
    Spawn { command: String, message: String },

    #[error("controller descriptor unavailable")]
    NoDescriptor,

    #[error("pseudo-terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}
