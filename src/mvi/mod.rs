//! Model-View-Intent primitives used for the session state machine.
//!
//! ```text
//! Intent ──→ Reducer ──→ State
//!    ↑                     │
//!    └──── side effects ───┘
//! ```
//!
//! Reducers are pure. Writing to the terminal, sleeping and signalling the
//! child all happen in the caller around a dispatch.

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::State;
