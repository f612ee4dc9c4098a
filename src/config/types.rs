use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub child: ChildConfig,
    pub session: SessionConfig,
    pub confirm: ConfirmConfig,
    /// Extra fixed-response rules, evaluated after the goodbye rule and
    /// before the confirmation rule.
    pub rules: Vec<RuleConfig>,
    pub history: HistoryConfig,
}

/// The driven program.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChildConfig {
    /// Executable name or path (default: "aider").
    pub command: String,
    /// Arguments passed before any given on the command line.
    pub args: Vec<String>,
    /// Working directory (default: current directory).
    pub cwd: Option<PathBuf>,
    /// Extra environment variables.
    pub env: BTreeMap<String, String>,
    /// Terminal rows (default: controlling terminal, else 24).
    pub rows: Option<u16>,
    /// Terminal columns (default: controlling terminal, else 80).
    pub cols: Option<u16>,
}

impl Default for ChildConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            rows: None,
            cols: None,
        }
    }
}

/// Loop timing and the fixed parts of the interaction protocol.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Readiness wait bound in milliseconds (default: 100).
    pub poll_interval_ms: u64,
    /// Maximum bytes per read (default: 1024).
    pub read_chunk: usize,
    /// Delay after first output before bootstrapping (default: 1000).
    pub settle_delay_ms: u64,
    /// Delay between bootstrap commands (default: 500).
    pub bootstrap_pause_ms: u64,
    /// Delay after bootstrap before the instruction (default: 1000).
    pub instruction_delay_ms: u64,
    /// SIGTERM grace period in seconds (default: 5).
    pub shutdown_grace_secs: u64,
    /// Phrase that marks a successful end (default: "Goodbye!").
    pub goodbye_phrase: String,
    /// Commands written once after the first output.
    pub bootstrap: Vec<String>,
    /// Appended to bootstrap commands, the instruction and answers.
    pub line_ending: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            read_chunk: 1024,
            settle_delay_ms: 1000,
            bootstrap_pause_ms: 500,
            instruction_delay_ms: 1000,
            shutdown_grace_secs: 5,
            goodbye_phrase: "Goodbye!".to_string(),
            bootstrap: vec!["/git init".to_string(), "/chat-mode code".to_string()],
            line_ending: "\n".to_string(),
        }
    }
}

/// Policy for generic yes/no prompts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfirmConfig {
    /// Substrings that identify a confirmation prompt.
    pub prompts: Vec<String>,
    /// If any of these is in the buffer, answer negatively.
    pub negative_markers: Vec<String>,
    pub affirmative: String,
    pub negative: String,
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self {
            prompts: vec!["(Y)es/(N)o".to_string()],
            negative_markers: vec![
                "pip install".to_string(),
                "CONVENTIONS.md".to_string(),
                "table_description.txt".to_string(),
            ],
            affirmative: "yes".to_string(),
            negative: "no".to_string(),
        }
    }
}

/// A fixed-response prompt rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    pub triggers: Vec<String>,
    /// Written followed by the session line ending.
    pub response: String,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub once: bool,
}

/// Session-history artifacts cleared before each run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub files: Vec<PathBuf>,
    pub reset: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            files: vec![
                PathBuf::from(".aider.chat.history.md"),
                PathBuf::from(".aider.input.history"),
            ],
            reset: true,
        }
    }
}

fn default_command() -> String {
    "aider".to_string()
}
