//! CSV export of log entries.
//!
//! # Invariants
//! - Header is `name,time,timezone,productivity_level,notes`.
//! - Time is RFC 3339 in the entry's own zone; productivity is its storage token.
//! - Fields are quoted only when they contain a delimiter, quote or newline.

use crate::model::log_entry::LogEntry;
use csv::Writer;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::Path;

pub const CSV_HEADER: [&str; 5] = ["name", "time", "timezone", "productivity_level", "notes"];

#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Io(std::io::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "csv error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Renders `entries` as CSV text, in the given order.
pub fn export_csv(entries: &[LogEntry]) -> ExportResult<String> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, entries)?;
    String::from_utf8(buffer)
        .map_err(|err| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

/// Writes `entries` as CSV to `path`, replacing any existing file.
pub fn write_csv(path: impl AsRef<Path>, entries: &[LogEntry]) -> ExportResult<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_records(file, entries)?;
    info!(
        "event=csv_export module=export status=ok rows={} path={}",
        entries.len(),
        path.display()
    );
    Ok(())
}

fn write_records<W: Write>(sink: W, entries: &[LogEntry]) -> ExportResult<()> {
    let mut wtr = Writer::from_writer(sink);
    wtr.write_record(CSV_HEADER)?;

    for entry in entries {
        let time = entry.local_time().to_rfc3339();
        wtr.write_record([
            entry.name.as_str(),
            time.as_str(),
            entry.timezone.name(),
            entry.productivity_level.token(),
            entry.notes.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
