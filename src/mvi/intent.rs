//! Base trait for intents.

/// Marker trait for intent objects.
///
/// Intents are events observed by the orchestrator (output arrived, the child
/// exited, a signal was received) and are fed to a reducer.
pub trait Intent: Send + 'static {}
