//! Reducer for the session phase machine.

use crate::mvi::Reducer;

use super::intent::SessionIntent;
use super::state::SessionPhase;

/// Pure phase transitions. Writing bootstrap commands and the instruction is
/// done by the caller; the reducer only records that it happened.
pub struct SessionReducer;

impl Reducer for SessionReducer {
    type State = SessionPhase;
    type Intent = SessionIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        if state.is_terminal() {
            return state;
        }

        match intent {
            SessionIntent::FirstOutput => match state {
                SessionPhase::Starting => SessionPhase::Bootstrapping,
                other => other,
            },

            SessionIntent::BootstrapWritten => match state {
                SessionPhase::Bootstrapping => SessionPhase::AwaitingInstructionDispatch,
                other => other,
            },

            SessionIntent::InstructionWritten => match state {
                SessionPhase::AwaitingInstructionDispatch => SessionPhase::Running,
                other => other,
            },

            SessionIntent::GoodbyeObserved => match state {
                SessionPhase::Running => SessionPhase::Ended,
                other => other,
            },

            SessionIntent::ChildExited { .. } | SessionIntent::FatalIo => SessionPhase::Failed,

            SessionIntent::Cancelled => SessionPhase::Interrupted,
        }
    }
}
