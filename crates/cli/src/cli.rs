use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Interactive driver for the evloop scheduler.
///
/// Submits greeting, file and API tasks to the event loop either
/// synchronously or asynchronously and advances the loop one tick per choice.
#[derive(Parser, Debug)]
#[command(name = "evloop", version, about)]
pub struct CliArgs {
    /// Path to a TOML config file (default: environment variables only)
    #[arg(long, env = "EVLOOP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Menu-driven session; one tick per menu choice (default)
    Interactive,
    /// Submit every task in both modes and drive the loop until idle
    Demo {
        /// Leave out the API task (no network access)
        #[arg(long)]
        skip_fetch: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_interactive() {
        let args = CliArgs::try_parse_from(["evloop"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn test_demo_flags() {
        let args =
            CliArgs::try_parse_from(["evloop", "demo", "--skip-fetch", "--config", "x.toml"]).unwrap();
        assert_eq!(args.command, Some(Command::Demo { skip_fetch: true }));
        assert_eq!(args.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }
}
