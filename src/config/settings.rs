//! Conversion from file configuration into the runtime settings consumed by
//! the session core.

use std::time::Duration;

use crate::config::types::Config;
use crate::pty::SpawnConfig;
use crate::session::{
    ConfirmPolicy, EngineSettings, OrchestratorSettings, PromptRule, Response, RuleTable,
};

impl Config {
    fn line(&self, text: &str) -> Vec<u8> {
        let mut bytes = text.as_bytes().to_vec();
        bytes.extend_from_slice(self.session.line_ending.as_bytes());
        bytes
    }

    /// Goodbye first, then configured fixed rules in file order, then the
    /// confirmation rule.
    pub fn rule_table(&self) -> RuleTable {
        let mut rules = Vec::with_capacity(self.rules.len() + 2);
        rules.push(PromptRule::new(
            "goodbye",
            vec![self.session.goodbye_phrase.clone()],
            Response::EndSession,
        ));
        for rule in &self.rules {
            rules.push(
                PromptRule::new(
                    rule.name.clone(),
                    rule.triggers.clone(),
                    Response::Fixed(self.line(&rule.response)),
                )
                .repeatable(rule.repeatable)
                .once(rule.once),
            );
        }
        rules.push(PromptRule::new(
            "confirm",
            self.confirm.prompts.clone(),
            Response::Confirm(ConfirmPolicy {
                negative_markers: self.confirm.negative_markers.clone(),
                affirmative: self.line(&self.confirm.affirmative),
                negative: self.line(&self.confirm.negative),
            }),
        ));
        RuleTable::new(rules)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            bootstrap: self.session.bootstrap.iter().map(|c| self.line(c)).collect(),
            settle_delay: Duration::from_millis(self.session.settle_delay_ms),
            bootstrap_pause: Duration::from_millis(self.session.bootstrap_pause_ms),
            instruction_delay: Duration::from_millis(self.session.instruction_delay_ms),
            line_ending: self.session.line_ending.clone(),
            rules: self.rule_table(),
        }
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            poll_interval: Duration::from_millis(self.session.poll_interval_ms),
            read_chunk: self.session.read_chunk,
            shutdown_grace: Duration::from_secs(self.session.shutdown_grace_secs),
        }
    }

    /// Spawn parameters. Unset terminal dimensions fall back to
    /// `terminal_size` (the controlling terminal, if any).
    pub fn spawn_config(&self, terminal_size: Option<(u16, u16)>) -> SpawnConfig {
        let (cols, rows) = terminal_size.unwrap_or((80, 24));
        SpawnConfig::new(self.child.command.clone(), self.child.args.clone())
            .with_cwd(self.child.cwd.clone())
            .with_env(
                self.child
                    .env
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )
            .with_size(self.child.rows.unwrap_or(rows), self.child.cols.unwrap_or(cols))
    }
}
