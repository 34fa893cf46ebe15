//! `bumplog` - CLI for the vehicle logbook
//!
//! Each invocation loads the snapshot, dispatches one command against the
//! application state, and prints the resulting view.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use chrono::Local;
use clap::Parser;

use bumplog::cli::{
    AddCommand, Cli, ClearCommand, Command, ConfigCommand, DaysCommand, OutputFormat,
    RemoveCommand, SetCommand, ShowCommand,
};
use bumplog::{init_logging, AppState, Config, DayGroup, Event, EventStore, SqliteKv, ViewState};

type App = AppState<SqliteKv>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Add(cmd) => handle_add(&config, &cmd),
        Command::Set(cmd) => handle_set(&config, &cmd),
        Command::Remove(cmd) => handle_remove(&config, &cmd),
        Command::Clear(cmd) => handle_clear(&config, &cmd),
        Command::Show(cmd) => handle_show(&config, &cmd),
        Command::Days(cmd) => handle_days(&config, &cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_kv(config: &Config) -> anyhow::Result<SqliteKv> {
    let path = config.database_path();
    SqliteKv::open(&path).with_context(|| format!("opening event database {}", path.display()))
}

fn open_app(config: &Config) -> anyhow::Result<App> {
    Ok(AppState::new(EventStore::open(
        open_kv(config)?,
        config.snapshot_key(),
    )))
}

fn handle_add(config: &Config, cmd: &AddCommand) -> anyhow::Result<()> {
    let mut app = open_app(config)?;
    let event = app.create(cmd.model.clone(), cmd.is_entry(config.events.default_is_entry));
    println!("Logged {}", format_event(&event));
    Ok(())
}

fn handle_set(config: &Config, cmd: &SetCommand) -> anyhow::Result<()> {
    let mut app = open_app(config)?;
    let id = app.store().resolve(&cmd.id)?;
    let patch = cmd.patch();
    if patch.is_empty() {
        println!("Nothing to change. Use --model, --entry, or --exit.");
        return Ok(());
    }

    app.dispatch(bumplog::Command::Update { id, patch });
    if let Some(event) = app.store().get(id) {
        println!("Updated {}", format_event(event));
    }
    Ok(())
}

fn handle_remove(config: &Config, cmd: &RemoveCommand) -> anyhow::Result<()> {
    let mut app = open_app(config)?;
    let id = app.store().resolve(&cmd.id)?;
    let view = app.dispatch(bumplog::Command::Delete { id });
    println!("Deleted {}", id.short());
    println!("{} day(s) remaining", view.page_count);
    Ok(())
}

fn handle_clear(config: &Config, cmd: &ClearCommand) -> anyhow::Result<()> {
    let mut app = open_app(config)?;
    let count = app.store().len();
    if !cmd.yes {
        println!("This will delete all {count} logged events.");
        println!("Use --yes to confirm.");
        return Ok(());
    }

    app.dispatch(bumplog::Command::ClearAll);
    println!("Deleted {count} events.");
    Ok(())
}

fn handle_show(config: &Config, cmd: &ShowCommand) -> anyhow::Result<()> {
    let mut app = open_app(config)?;
    let view = app.dispatch(bumplog::Command::GoTo(cmd.page));

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Plain | OutputFormat::Table => print_view(&view, cmd.page, cmd.format),
    }
    Ok(())
}

fn print_view(view: &ViewState, requested: usize, format: OutputFormat) {
    let Some(page) = &view.page else {
        println!("No events logged yet.");
        return;
    };

    if requested != view.page_index {
        println!(
            "Only {} day(s) logged; showing the oldest.",
            view.page_count
        );
    }

    if format == OutputFormat::Table {
        println!(
            "{}  (day {} of {}, {} in / {} out)",
            page.day.format("%A %Y-%m-%d"),
            view.page_index + 1,
            view.page_count,
            page.entries(),
            page.exits()
        );
        println!("{}", "-".repeat(48));
    }
    for event in &page.events {
        println!("{}", format_event(event));
    }

    if format == OutputFormat::Table && (view.has_newer || view.has_older) {
        println!();
        if view.has_older {
            println!("Older: bumplog show --page {}", view.page_index + 1);
        }
        if view.has_newer {
            println!("Newer: bumplog show --page {}", view.page_index - 1);
        }
    }
}

fn handle_days(config: &Config, cmd: &DaysCommand) -> anyhow::Result<()> {
    let app = open_app(config)?;
    let groups = app.grouped_events();

    if cmd.format == OutputFormat::Json {
        let summary: Vec<_> = groups.iter().map(day_summary).collect();
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if groups.is_empty() {
        println!("No events logged yet.");
        return Ok(());
    }

    if cmd.format == OutputFormat::Table {
        println!("{:>4}  {:<10}  {:>6}  {:>4}  {:>4}", "page", "day", "events", "in", "out");
    }
    for (page, group) in groups.iter().enumerate() {
        println!(
            "{:>4}  {:<10}  {:>6}  {:>4}  {:>4}",
            page,
            group.day,
            group.events.len(),
            group.entries(),
            group.exits()
        );
    }
    Ok(())
}

fn day_summary(group: &DayGroup) -> serde_json::Value {
    serde_json::json!({
        "day": group.day,
        "events": group.events.len(),
        "entries": group.entries(),
        "exits": group.exits(),
    })
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut store = EventStore::with_key(open_kv(config)?, config.snapshot_key());
    // Report an unreadable snapshot rather than loading it as empty.
    let snapshot_error = store.try_load().err().map(|e| e.to_string());
    let stats = store.stats();
    let backend = store.backend();
    let snapshot_written = backend.updated_at(store.snapshot_key())?;

    if json {
        let status = serde_json::json!({
            "database_path": backend.path(),
            "database_size_bytes": backend.size_bytes(),
            "snapshot_key": store.snapshot_key(),
            "snapshot_written": snapshot_written,
            "snapshot_error": snapshot_error,
            "events": stats.total,
            "entries": stats.entries,
            "exits": stats.exits,
            "days": stats.days,
            "oldest": stats.oldest,
            "newest": stats.newest,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("bumplog status");
        println!("--------------");
        println!("Database:      {}", backend.path().display());
        println!("Size:          {} bytes", backend.size_bytes());
        println!("Snapshot key:  {}", store.snapshot_key());
        if let Some(written) = snapshot_written {
            println!(
                "Last written:  {}",
                written.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            );
        }
        if let Some(err) = &snapshot_error {
            println!("Snapshot:      unreadable ({err})");
        }
        println!();
        println!("Events:        {}", stats.total);
        println!("  Entries:     {}", stats.entries);
        println!("  Exits:       {}", stats.exits);
        println!("Days:          {}", stats.days);
        if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
            println!(
                "Range:         {} .. {}",
                oldest.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                newest.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Snapshot key:       {}", config.snapshot_key());
                println!();
                println!("[Events]");
                println!(
                    "  Default direction:  {}",
                    if config.events.default_is_entry {
                        "entry"
                    } else {
                        "exit"
                    }
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("invalid configuration in {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

fn format_event(event: &Event) -> String {
    let model = if event.vehicle_model.is_empty() {
        "-"
    } else {
        event.vehicle_model.as_str()
    };
    format!(
        "{}  {}  {:<5}  {}",
        event.id.short(),
        event.timestamp.with_timezone(&Local).format("%H:%M:%S"),
        event.direction().to_string(),
        model
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_fails_on_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nsnapshot_key = \"\"\n").unwrap();

        let result = handle_config(&Config::default(), ConfigCommand::Validate { file: Some(path) });
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("snapshot_key"));
    }

    #[test]
    fn test_validate_accepts_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nsnapshot_key = \"gate-b\"\n").unwrap();

        let result = handle_config(&Config::default(), ConfigCommand::Validate { file: Some(path) });
        assert!(result.is_ok());
    }
}
