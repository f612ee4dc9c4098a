use portable_pty::{CommandBuilder, PtySize};
use std::io;
use std::path::PathBuf;

const DEFAULT_TERM: &str = "xterm-256color";

/// Everything needed to start the driven program on a fresh pseudo-terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnConfig {
    command: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
    rows: u16,
    cols: u16,
}

impl SpawnConfig {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            cwd: None,
            env: Vec::new(),
            rows: 24,
            cols: 80,
        }
    }

    pub fn with_cwd(mut self, cwd: Option<PathBuf>) -> Self {
        self.cwd = cwd;
        self
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    pub fn with_size(mut self, rows: u16, cols: u16) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn pty_size(&self) -> PtySize {
        PtySize {
            rows: self.rows,
            cols: self.cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }

    /// Environment passed to the child: `TERM` defaults to
    /// `xterm-256color`, configured entries are applied on top in order.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        let mut env = Vec::with_capacity(self.env.len() + 1);
        if !self.env.iter().any(|(k, _)| k == "TERM") {
            env.push(("TERM".to_string(), DEFAULT_TERM.to_string()));
        }
        env.extend(self.env.iter().cloned());
        env
    }

    pub fn command_builder(&self) -> io::Result<CommandBuilder> {
        let mut cmd = CommandBuilder::new(&self.command);
        cmd.args(&self.args);
        let cwd = match &self.cwd {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        cmd.cwd(cwd);
        for (key, value) in self.env_pairs() {
            cmd.env(key, value);
        }
        Ok(cmd)
    }
}
