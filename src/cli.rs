use clap::Parser;
use std::path::PathBuf;

/// Drive an interactive command-line program through a pseudo-terminal.
#[derive(Debug, Parser)]
#[command(name = "promptpilot", version, about)]
pub struct Cli {
    /// Instruction written once the program is bootstrapped.
    pub instruction: String,

    /// Config file (default: ~/.config/promptpilot/config.toml).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the program to run.
    #[arg(long, value_name = "CMD")]
    pub command: Option<String>,

    /// Keep the session-history files instead of truncating them.
    #[arg(long)]
    pub no_history_reset: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Extra arguments for the program, after `--`.
    #[arg(last = true, value_name = "CHILD_ARGS")]
    pub child_args: Vec<String>,
}
