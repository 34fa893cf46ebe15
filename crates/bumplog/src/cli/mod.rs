//! Command-line interface for bumplog.
//!
//! This module provides the CLI structure for the `bumplog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ClearCommand, ConfigCommand, DaysCommand, OutputFormat, RemoveCommand,
    SetCommand, ShowCommand, StatusCommand,
};

/// bumplog - Log vehicles entering and leaving
///
/// Records each vehicle crossing with a timestamp, an optional model, and
/// whether it was an entry or an exit. Events are browsed one day at a time.
#[derive(Debug, Parser)]
#[command(name = "bumplog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log a vehicle entry or exit
    Add(AddCommand),

    /// Edit a logged event
    Set(SetCommand),

    /// Delete a logged event
    #[command(alias = "rm")]
    Remove(RemoveCommand),

    /// Delete all logged events
    Clear(ClearCommand),

    /// Show one day of events
    Show(ShowCommand),

    /// List days that have events
    Days(DaysCommand),

    /// Show event counts and storage status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "bumplog");
    }

    #[test]
    fn test_verbosity_flags() {
        use crate::logging::Verbosity;

        assert_eq!(parse(&["bumplog", "-q", "days"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["bumplog", "days"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["bumplog", "-v", "days"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["bumplog", "-vv", "days"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_add() {
        let cli = parse(&["bumplog", "add", "--model", "Opel Astra", "--exit"]);
        match cli.command {
            Command::Add(add) => {
                assert_eq!(add.model, "Opel Astra");
                assert!(add.exit);
                assert!(!add.is_entry(true));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_add_defaults() {
        let cli = parse(&["bumplog", "add"]);
        match cli.command {
            Command::Add(add) => {
                assert_eq!(add.model, "");
                assert!(add.is_entry(true));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_add_entry_and_exit_conflict() {
        assert!(Cli::try_parse_from(["bumplog", "add", "--entry", "--exit"]).is_err());
    }

    #[test]
    fn test_parse_set() {
        let cli = parse(&["bumplog", "set", "4f2a", "--model", "Tesla Model 3"]);
        match cli.command {
            Command::Set(set) => {
                assert_eq!(set.id, "4f2a");
                assert_eq!(set.patch().vehicle_model.as_deref(), Some("Tesla Model 3"));
                assert_eq!(set.patch().is_entry, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rm_alias() {
        let cli = parse(&["bumplog", "rm", "4f2a"]);
        assert!(matches!(cli.command, Command::Remove(RemoveCommand { ref id }) if id == "4f2a"));
    }

    #[test]
    fn test_parse_clear_requires_nothing() {
        let cli = parse(&["bumplog", "clear"]);
        assert!(matches!(cli.command, Command::Clear(ClearCommand { yes: false })));

        let cli = parse(&["bumplog", "clear", "--yes"]);
        assert!(matches!(cli.command, Command::Clear(ClearCommand { yes: true })));
    }

    #[test]
    fn test_parse_show_page() {
        let cli = parse(&["bumplog", "show", "--page", "3", "--format", "json"]);
        match cli.command {
            Command::Show(show) => {
                assert_eq!(show.page, 3);
                assert_eq!(show.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_days_and_status_output_flags() {
        let cli = parse(&["bumplog", "days", "--format", "plain"]);
        assert!(matches!(
            cli.command,
            Command::Days(DaysCommand { format: OutputFormat::Plain })
        ));

        let cli = parse(&["bumplog", "days"]);
        assert!(matches!(
            cli.command,
            Command::Days(DaysCommand { format: OutputFormat::Table })
        ));

        let cli = parse(&["bumplog", "status", "--json"]);
        assert!(matches!(cli.command, Command::Status(StatusCommand { json: true })));
    }

    #[test]
    fn test_parse_config_validate_file() {
        let cli = parse(&["bumplog", "config", "validate", "--file", "/tmp/c.toml"]);
        match cli.command {
            Command::Config(ConfigCommand::Validate { file }) => {
                assert_eq!(file, Some(PathBuf::from("/tmp/c.toml")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["bumplog", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn test_parse_config_path() {
        let cli = parse(&["bumplog", "config", "path"]);
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Path)));
    }
}
