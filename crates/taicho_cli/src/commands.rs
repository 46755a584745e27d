//! Command handlers. Each handler stages its changes and commits once.

use crate::cli::{Commands, LogAddArgs, LogCommand, PresetCommand};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use taicho_core::clock::{current_timezone, now_rounded, parse_timezone};
use taicho_core::model::validation::normalize_name;
use taicho_core::view_model::log_entry_row::LogEntryRowViewModel;
use taicho_core::view_model::preset_option::preset_sections;
use taicho_core::{
    core_version, export_csv, write_csv, AppContext, ExportError, LogEntry, LogEntryDraft,
    LogEntrySearch, PresetDraft, StoreError, ValidationError,
};
use uuid::Uuid;

#[derive(Debug)]
pub enum CliError {
    /// Bad argument that is not a record field, e.g. an unknown zone.
    Usage(String),
    Validation(ValidationError),
    Store(StoreError),
    Export(ExportError),
    Io(std::io::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usage(message) => write!(f, "{message}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(StoreError::Validation(err)) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {}

impl From<ValidationError> for CliError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ExportError> for CliError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

pub type CliResult = Result<(), CliError>;

pub fn run(ctx: &mut AppContext, command: Commands, out: &mut impl Write) -> CliResult {
    match command {
        Commands::Preset(command) => run_preset(ctx, command, out),
        Commands::Log(LogCommand::Add(args)) => add_entry(ctx, args, out),
        Commands::Log(LogCommand::Preset { name }) => add_entry_from_preset(ctx, &name, out),
        Commands::List => {
            let entries = ctx.entries().get_all(ctx.store());
            print_entries(&entries, out)
        }
        Commands::Search {
            name,
            date,
            timezone,
        } => search(ctx, name, date, timezone, out),
        Commands::Delete { id } => delete_entry(ctx, &id, out),
        Commands::Export { path } => {
            let entries = ctx.entries().get_all(ctx.store());
            match path {
                Some(path) => {
                    write_csv(&path, &entries)?;
                    writeln!(out, "Exported {} entries to {}", entries.len(), path.display())?;
                }
                None => write!(out, "{}", export_csv(&entries)?)?,
            }
            Ok(())
        }
        Commands::Version => {
            writeln!(out, "taicho {}", core_version())?;
            Ok(())
        }
    }
}

fn run_preset(ctx: &mut AppContext, command: PresetCommand, out: &mut impl Write) -> CliResult {
    match command {
        PresetCommand::Add {
            name,
            productivity,
            icon,
        } => {
            let new_preset = PresetDraft {
                name,
                productivity,
                icon,
            }
            .validate()?;
            let (presets, store) = ctx.presets_and_store();
            let preset = presets.create_validated(store, &new_preset)?;
            ctx.save_context()?;
            writeln!(out, "Added preset {} {}", preset.icon, preset.name)?;
        }
        PresetCommand::List => {
            let sections = preset_sections(&ctx.presets().get_all(ctx.store()));
            if sections.is_empty() {
                writeln!(out, "No presets yet.")?;
            }
            for section in sections {
                writeln!(out, "{}", section.title)?;
                for option in section.options {
                    writeln!(out, "  {} {}", option.icon, option.name)?;
                }
            }
        }
        PresetCommand::Delete { name } => {
            let preset = ctx
                .presets()
                .find_by_name(ctx.store(), &normalize_name(&name))
                .ok_or_else(|| CliError::Usage(format!("no preset named `{name}`")))?;
            let (presets, store) = ctx.presets_and_store();
            presets.delete(store, std::slice::from_ref(&preset))?;
            ctx.save_context()?;
            writeln!(out, "Deleted preset {}", preset.name)?;
        }
    }
    Ok(())
}

fn add_entry(ctx: &mut AppContext, args: LogAddArgs, out: &mut impl Write) -> CliResult {
    let timezone = resolve_timezone(args.timezone.as_deref())?;
    let draft = LogEntryDraft {
        name: args.name,
        time: args.time.unwrap_or_else(|| now_rounded().to_rfc3339()),
        productivity: args.productivity,
        notes: args.notes,
    };
    let new_entry = draft.validate(timezone)?;

    let (entries, store) = ctx.entries_and_store();
    let entry = entries.create(store, new_entry)?;
    ctx.save_context()?;
    print_entries(std::slice::from_ref(&entry), out)
}

fn add_entry_from_preset(ctx: &mut AppContext, name: &str, out: &mut impl Write) -> CliResult {
    let preset = ctx
        .presets()
        .find_by_name(ctx.store(), &normalize_name(name))
        .ok_or_else(|| CliError::Usage(format!("no preset named `{name}`")))?;

    let (entries, store) = ctx.entries_and_store();
    let entry = entries.create_from_preset(store, &preset)?;
    ctx.save_context()?;
    print_entries(std::slice::from_ref(&entry), out)
}

fn search(
    ctx: &AppContext,
    name: Option<String>,
    date: Option<String>,
    timezone: Option<String>,
    out: &mut impl Write,
) -> CliResult {
    let mut query = LogEntrySearch::default();
    if let Some(name) = name {
        query = query.name(name);
    }
    if let Some(date) = date {
        let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| CliError::Usage(format!("invalid date `{date}`, expected YYYY-MM-DD")))?;
        query = query.on(day);
    }
    query = query.in_timezone(resolve_timezone(timezone.as_deref())?);

    let found = ctx.entries().search(ctx.store(), &query);
    print_entries(&found, out)
}

fn delete_entry(ctx: &mut AppContext, id: &str, out: &mut impl Write) -> CliResult {
    let id = Uuid::parse_str(id.trim())
        .map_err(|_| CliError::Usage(format!("invalid entry id `{id}`")))?;
    let entry = ctx
        .entries()
        .get(ctx.store(), id)
        .ok_or_else(|| CliError::Usage(format!("no entry with id {id}")))?;

    let (entries, store) = ctx.entries_and_store();
    entries.delete(store, std::slice::from_ref(&entry))?;
    ctx.save_context()?;
    writeln!(out, "Deleted {}", entry.name)?;
    Ok(())
}

fn resolve_timezone(name: Option<&str>) -> Result<chrono_tz::Tz, CliError> {
    match name {
        Some(name) => parse_timezone(name)
            .ok_or_else(|| CliError::Usage(format!("unknown timezone `{name}`"))),
        None => Ok(current_timezone()),
    }
}

fn print_entries(entries: &[LogEntry], out: &mut impl Write) -> CliResult {
    if entries.is_empty() {
        writeln!(out, "No entries.")?;
        return Ok(());
    }
    for entry in entries {
        let row = LogEntryRowViewModel::new(entry.clone());
        let display = row.display();
        write!(
            out,
            "{}  {}  {} [{}]",
            row.id(),
            display.time,
            display.name,
            display.productivity
        )?;
        if !display.notes.is_empty() {
            write!(out, "  📝 {}", display.notes)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run, CliError};
    use crate::cli::{Commands, LogAddArgs, LogCommand, PresetCommand};
    use taicho_core::{AppContext, CoreConfig, FaultPolicy};

    fn context() -> AppContext {
        let config = CoreConfig {
            fault_policy: FaultPolicy::LogAndRecover,
            ..CoreConfig::in_memory()
        };
        AppContext::open(&config).unwrap()
    }

    fn run_to_string(ctx: &mut AppContext, command: Commands) -> Result<String, CliError> {
        let mut out = Vec::new();
        run(ctx, command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn preset_then_log_from_preset() {
        let mut ctx = context();
        run_to_string(
            &mut ctx,
            Commands::Preset(PresetCommand::Add {
                name: "Reading".to_string(),
                productivity: "High".to_string(),
                icon: "📖".to_string(),
            }),
        )
        .unwrap();

        let listed = run_to_string(&mut ctx, Commands::Preset(PresetCommand::List)).unwrap();
        assert_eq!(listed, "High\n  📖 Reading\n");

        let logged = run_to_string(
            &mut ctx,
            Commands::Log(LogCommand::Preset {
                name: "Reading".to_string(),
            }),
        )
        .unwrap();
        assert!(logged.contains("Reading [High]"));
        assert_eq!(ctx.entries().get_all(ctx.store()).len(), 1);
    }

    #[test]
    fn invalid_entry_reports_alert_text_and_saves_nothing() {
        let mut ctx = context();
        let err = run_to_string(
            &mut ctx,
            Commands::Log(LogCommand::Add(LogAddArgs {
                name: "  ".to_string(),
                productivity: "High".to_string(),
                time: None,
                timezone: Some("UTC".to_string()),
                notes: None,
            })),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Error! Log must have a name.");
        assert!(ctx.entries().get_all(ctx.store()).is_empty());
    }

    #[test]
    fn search_by_day_prints_matches() {
        let mut ctx = context();
        run_to_string(
            &mut ctx,
            Commands::Log(LogCommand::Add(LogAddArgs {
                name: "Standup".to_string(),
                productivity: "medium".to_string(),
                time: Some("2026-10-18 09:30".to_string()),
                timezone: Some("Europe/Berlin".to_string()),
                notes: Some("short one".to_string()),
            })),
        )
        .unwrap();

        let found = run_to_string(
            &mut ctx,
            Commands::Search {
                name: None,
                date: Some("2026-10-18".to_string()),
                timezone: Some("Europe/Berlin".to_string()),
            },
        )
        .unwrap();
        assert!(found.contains("Oct 18, 2026 at 9:30 AM  Standup [Medium]  📝 short one"));

        let none = run_to_string(
            &mut ctx,
            Commands::Search {
                name: None,
                date: Some("2026-10-19".to_string()),
                timezone: Some("Europe/Berlin".to_string()),
            },
        )
        .unwrap();
        assert_eq!(none, "No entries.\n");
    }

    #[test]
    fn unknown_timezone_is_a_usage_error() {
        let mut ctx = context();
        let err = run_to_string(
            &mut ctx,
            Commands::Search {
                name: None,
                date: None,
                timezone: Some("Mars/Base".to_string()),
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }
}
