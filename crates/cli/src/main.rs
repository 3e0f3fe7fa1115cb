mod cli;
mod terminal;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use evloop_core::{load_dotenv, Config, ExecutionMode, KeySequence};
use evloop_handlers::Task;
use evloop_runtime::{Scheduler, StdoutSink, TracingSink};

use crate::cli::{CliArgs, Command};
use crate::terminal::{MenuChoice, Terminal};

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let args = CliArgs::parse();
    let command = args.command.clone().unwrap_or(Command::Interactive);

    // Interactive sessions keep the terminal for the menu; demo runs narrate via logs.
    let default_filter = match command {
        Command::Interactive => "warn",
        Command::Demo { .. } => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    let config = Config::load(args.config.as_deref()).context("failed to load configuration")?;
    config.log_summary();

    match command {
        Command::Interactive => run_interactive(&config).await,
        Command::Demo { skip_fetch } => run_demo(&config, skip_fetch).await,
    }
}

/// Menu loop: every choice (including "collect") performs exactly one tick.
async fn run_interactive(config: &Config) -> Result<()> {
    let mut terminal = Terminal::new();
    // Results are rendered from the tick report; the sink only logs them.
    let mut scheduler = Scheduler::new().with_sink(Arc::new(TracingSink));
    let keys = KeySequence::new();

    terminal.print_banner()?;
    loop {
        match terminal.prompt_menu().await? {
            MenuChoice::Exit => break,
            MenuChoice::Collect => {}
            MenuChoice::Submit(task) => {
                let Some(mode) = terminal.prompt_mode().await? else {
                    break;
                };
                let key = task.submit(&mut scheduler, &keys, mode, &config.handlers);
                info!(key = %key, mode = %mode, "submitted task");
            }
        }

        let report = scheduler.tick().await.context("event loop tick failed")?;
        terminal.print_report(&report)?;
    }

    if scheduler.in_flight() > 0 || scheduler.completed_len() > 0 {
        terminal.print_info(&format!(
            "Exiting with {} async task(s) still running and {} undelivered result(s).",
            scheduler.in_flight(),
            scheduler.completed_len()
        ))?;
    }
    terminal.print_info("Goodbye.")?;
    Ok(())
}

/// Headless run: submit every task in both modes, then drive until idle.
async fn run_demo(config: &Config, skip_fetch: bool) -> Result<()> {
    let mut scheduler = Scheduler::new().with_sink(Arc::new(StdoutSink));
    let keys = KeySequence::new();

    for mode in [ExecutionMode::Sync, ExecutionMode::Async] {
        for task in Task::ALL {
            if skip_fetch && task == Task::FetchRecord {
                continue;
            }
            task.submit(&mut scheduler, &keys, mode, &config.handlers);
        }
    }
    let submitted = keys.issued();

    let delivered = scheduler
        .run_until_idle(config.driver.poll_interval())
        .await
        .context("event loop tick failed")?;
    info!(submitted, delivered, "demo finished");
    Ok(())
}
