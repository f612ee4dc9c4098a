//! Prompt-driven session orchestration.
//!
//! # Architecture
//!
//! - `buffer.rs` - output accumulated since the last fired rule
//! - `rules.rs` - ordered trigger → response table
//! - `state.rs` / `intent.rs` / `reducer.rs` - flat phase machine
//! - `engine.rs` - bootstrap, instruction dispatch and rule evaluation
//! - `orchestrator.rs` - poll/read/write loop and shutdown discipline

mod buffer;
mod engine;
mod error;
mod intent;
mod orchestrator;
mod reducer;
mod rules;
mod state;

pub use buffer::SessionBuffer;
pub use engine::{Action, Engine, EngineSettings};
pub use error::{FailureReason, SessionError};
pub use intent::SessionIntent;
pub use orchestrator::{OrchestratorSettings, SessionOrchestrator, SessionReport};
pub use reducer::SessionReducer;
pub use rules::{ConfirmPolicy, PromptRule, Response, RuleMatch, RuleOutcome, RuleTable};
pub use state::SessionPhase;
