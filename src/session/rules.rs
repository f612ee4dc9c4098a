//! Ordered prompt-rule table.
//!
//! Each rule pairs a set of trigger substrings with a response. The table is
//! evaluated top to bottom and the first rule whose trigger is present in the
//! buffer wins.

use std::collections::HashSet;

use super::buffer::SessionBuffer;
use super::state::SessionPhase;

/// Answer to a generic yes/no prompt, chosen by looking at the rest of the
/// buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPolicy {
    /// Any of these in the buffer turns the answer negative.
    pub negative_markers: Vec<String>,
    pub affirmative: Vec<u8>,
    pub negative: Vec<u8>,
}

impl ConfirmPolicy {
    pub fn answer(&self, buffer: &SessionBuffer) -> &[u8] {
        if buffer.contains_any(&self.negative_markers) {
            &self.negative
        } else {
            &self.affirmative
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Write these bytes verbatim.
    Fixed(Vec<u8>),
    /// Context-sensitive yes/no.
    Confirm(ConfirmPolicy),
    /// The child said goodbye; stop reading and writing.
    EndSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRule {
    pub name: String,
    pub triggers: Vec<String>,
    pub response: Response,
    /// Keep the buffer after firing instead of resetting it.
    pub repeatable: bool,
    /// Fire at most once per session.
    pub once: bool,
}

impl PromptRule {
    pub fn new(name: impl Into<String>, triggers: Vec<String>, response: Response) -> Self {
        Self {
            name: name.into(),
            triggers,
            response,
            repeatable: false,
            once: false,
        }
    }

    pub fn repeatable(mut self, repeatable: bool) -> Self {
        self.repeatable = repeatable;
        self
    }

    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn matches(&self, buffer: &SessionBuffer) -> bool {
        buffer.contains_any(&self.triggers)
    }
}

/// What a fired rule asks the orchestrator to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Write(Vec<u8>),
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub index: usize,
    pub name: String,
    pub outcome: RuleOutcome,
    pub reset_buffer: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<PromptRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<PromptRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PromptRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find the first rule that fires for the current buffer.
    ///
    /// `fired` holds indices of rules that already fired this session; rules
    /// marked `once` are skipped if present. `EndSession` rules only apply
    /// while `Running`.
    pub fn evaluate(
        &self,
        buffer: &SessionBuffer,
        phase: SessionPhase,
        fired: &HashSet<usize>,
    ) -> Option<RuleMatch> {
        self.rules.iter().enumerate().find_map(|(index, rule)| {
            if rule.once && fired.contains(&index) {
                return None;
            }
            if matches!(rule.response, Response::EndSession) && phase != SessionPhase::Running {
                return None;
            }
            if !rule.matches(buffer) {
                return None;
            }
            let outcome = match &rule.response {
                Response::Fixed(bytes) => RuleOutcome::Write(bytes.clone()),
                Response::Confirm(policy) => RuleOutcome::Write(policy.answer(buffer).to_vec()),
                Response::EndSession => RuleOutcome::End,
            };
            Some(RuleMatch {
                index,
                name: rule.name.clone(),
                outcome,
                reset_buffer: !rule.repeatable,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirm() -> PromptRule {
        PromptRule::new(
            "confirm",
            vec!["(Y)es/(N)o".to_string()],
            Response::Confirm(ConfirmPolicy {
                negative_markers: vec!["pip install".to_string(), "CONVENTIONS.md".to_string()],
                affirmative: b"yes\n".to_vec(),
                negative: b"no\n".to_vec(),
            }),
        )
    }

    fn goodbye() -> PromptRule {
        PromptRule::new("goodbye", vec!["Goodbye!".to_string()], Response::EndSession)
    }

    fn buffer(text: &str) -> SessionBuffer {
        let mut buf = SessionBuffer::new();
        buf.append(text);
        buf
    }

    #[test]
    fn confirm_answers_yes_without_markers() {
        let table = RuleTable::new(vec![confirm()]);
        let hit = table
            .evaluate(&buffer("Ready (Y)es/(N)o"), SessionPhase::Running, &HashSet::new())
            .unwrap();
        assert_eq!(hit.outcome, RuleOutcome::Write(b"yes\n".to_vec()));
        assert!(hit.reset_buffer);
    }

    #[test]
    fn confirm_answers_no_with_install_marker() {
        let table = RuleTable::new(vec![confirm()]);
        let hit = table
            .evaluate(
                &buffer("pip install requested (Y)es/(N)o"),
                SessionPhase::Running,
                &HashSet::new(),
            )
            .unwrap();
        assert_eq!(hit.outcome, RuleOutcome::Write(b"no\n".to_vec()));
    }

    #[test]
    fn confirm_answers_no_for_protected_file() {
        let table = RuleTable::new(vec![confirm()]);
        let hit = table
            .evaluate(
                &buffer("Edit CONVENTIONS.md? (Y)es/(N)o"),
                SessionPhase::AwaitingInstructionDispatch,
                &HashSet::new(),
            )
            .unwrap();
        assert_eq!(hit.outcome, RuleOutcome::Write(b"no\n".to_vec()));
    }

    #[test]
    fn first_matching_rule_wins() {
        let table = RuleTable::new(vec![goodbye(), confirm()]);
        let hit = table
            .evaluate(
                &buffer("(Y)es/(N)o ... Goodbye!"),
                SessionPhase::Running,
                &HashSet::new(),
            )
            .unwrap();
        assert_eq!(hit.name, "goodbye");
        assert_eq!(hit.outcome, RuleOutcome::End);
    }

    #[test]
    fn end_session_skipped_before_running() {
        let table = RuleTable::new(vec![goodbye(), confirm()]);
        let hit = table
            .evaluate(
                &buffer("Goodbye! (Y)es/(N)o"),
                SessionPhase::AwaitingInstructionDispatch,
                &HashSet::new(),
            )
            .unwrap();
        assert_eq!(hit.name, "confirm");
    }

    #[test]
    fn once_rule_skipped_after_firing() {
        let rule = PromptRule::new(
            "token",
            vec!["API key:".to_string()],
            Response::Fixed(b"\n".to_vec()),
        )
        .once(true);
        let table = RuleTable::new(vec![rule]);
        let fired: HashSet<usize> = [0].into_iter().collect();
        assert!(table
            .evaluate(&buffer("API key:"), SessionPhase::Running, &fired)
            .is_none());
    }

    #[test]
    fn repeatable_rule_keeps_buffer() {
        let rule = PromptRule::new(
            "more",
            vec!["--More--".to_string()],
            Response::Fixed(b" ".to_vec()),
        )
        .repeatable(true);
        let table = RuleTable::new(vec![rule]);
        let hit = table
            .evaluate(&buffer("--More--"), SessionPhase::Running, &HashSet::new())
            .unwrap();
        assert!(!hit.reset_buffer);
    }

    #[test]
    fn no_trigger_no_match() {
        let table = RuleTable::new(vec![goodbye(), confirm()]);
        assert!(table
            .evaluate(&buffer("thinking..."), SessionPhase::Running, &HashSet::new())
            .is_none());
    }
}
