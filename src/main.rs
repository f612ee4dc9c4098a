use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::process::ExitCode;

use promptpilot::cli::Cli;
use promptpilot::config::Config;
use promptpilot::logging::init_tracing;
use promptpilot::pty::PtyLauncher;
use promptpilot::session::SessionOrchestrator;
use promptpilot::setup::reset_history;
use promptpilot::shutdown::CancelToken;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(command) = cli.command {
        config.child.command = command;
    }
    config.child.args.extend(cli.child_args);
    config.validate()?;

    if config.history.reset && !cli.no_history_reset {
        let base = match &config.child.cwd {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("failed to resolve working directory")?,
        };
        reset_history(&config.history.files, &base).context("failed to reset history files")?;
    }

    let cancel = CancelToken::new();
    cancel
        .register_signals()
        .context("failed to install signal handlers")?;

    let spawn = config.spawn_config(crossterm::terminal::size().ok());
    let mut orchestrator = SessionOrchestrator::new(
        PtyLauncher::new(spawn),
        config.engine_settings(),
        config.orchestrator_settings(),
        cancel,
        io::stdout(),
    );

    let report = orchestrator.run(&cli.instruction)?;
    eprintln!("\npromptpilot: {}", report.status_line());
    Ok(ExitCode::from(report.exit_code() as u8))
}
