//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::event::EventPatch;

/// Log a vehicle.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Vehicle model, e.g. "Toyota Corolla"
    #[arg(short, long, default_value = "")]
    pub model: String,

    /// Log an entry (default unless configured otherwise)
    #[arg(long, conflicts_with = "exit")]
    pub entry: bool,

    /// Log an exit
    #[arg(long)]
    pub exit: bool,
}

impl AddCommand {
    /// Resolve the entry flag against the configured default.
    #[must_use]
    pub fn is_entry(&self, default_is_entry: bool) -> bool {
        if self.entry {
            true
        } else if self.exit {
            false
        } else {
            default_is_entry
        }
    }
}

/// Edit a logged event.
#[derive(Debug, Args)]
pub struct SetCommand {
    /// Event id or unique id prefix
    pub id: String,

    /// New vehicle model (use "" to clear)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Mark as entry
    #[arg(long, conflicts_with = "exit")]
    pub entry: bool,

    /// Mark as exit
    #[arg(long)]
    pub exit: bool,
}

impl SetCommand {
    /// The fields this command changes.
    #[must_use]
    pub fn patch(&self) -> EventPatch {
        let is_entry = if self.entry {
            Some(true)
        } else if self.exit {
            Some(false)
        } else {
            None
        };
        EventPatch {
            vehicle_model: self.model.clone(),
            is_entry,
        }
    }
}

/// Delete a logged event.
#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// Event id or unique id prefix
    pub id: String,
}

/// Delete every logged event.
#[derive(Debug, Args)]
pub struct ClearCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Show one day of events.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Day to show: 0 is the most recent day, 1 the day before, ...
    #[arg(short, long, default_value = "0")]
    pub page: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// List days that have events.
#[derive(Debug, Args)]
pub struct DaysCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
