//! Base trait for reducer-driven state.

/// Marker trait for state objects.
///
/// States are cheap to copy around and comparable so that transitions can be
/// detected and logged by the caller.
pub trait State: Clone + PartialEq + Default + Send + 'static {}
