mod loader;
mod settings;
mod types;

pub use loader::ConfigError;
pub use types::{ChildConfig, Config, ConfirmConfig, HistoryConfig, RuleConfig, SessionConfig};
