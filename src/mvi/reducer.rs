//! Reducer trait.

use super::intent::Intent;
use super::state::State;

/// Pure transition function: `(State, Intent) -> State`.
///
/// Implementations never perform I/O; an intent that does not apply to the
/// current state returns the state unchanged.
pub trait Reducer {
    type State: State;
    type Intent: Intent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
