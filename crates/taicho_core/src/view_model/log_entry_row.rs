//! One history row.

use crate::clock::display_time;
use crate::model::log_entry::LogEntry;
use crate::model::EntityId;
use crate::notify::Publisher;
use log::warn;
use std::sync::mpsc::Receiver;

/// Display-ready text for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDisplay {
    pub name: String,
    /// Medium date, short time, in the entry's own zone.
    pub time: String,
    pub productivity: String,
    pub notes: String,
}

impl RowDisplay {
    fn from_entry(entry: &LogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            time: display_time(entry.time, entry.timezone),
            productivity: entry.productivity_level.display_name().to_string(),
            notes: entry.notes.clone().unwrap_or_default(),
        }
    }
}

/// Wraps one entry and broadcasts it whenever it is reloaded.
#[derive(Debug)]
pub struct LogEntryRowViewModel {
    entry: LogEntry,
    display: RowDisplay,
    changed: Publisher<LogEntry>,
}

impl LogEntryRowViewModel {
    pub fn new(entry: LogEntry) -> Self {
        let display = RowDisplay::from_entry(&entry);
        Self {
            entry,
            display,
            changed: Publisher::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.entry.id
    }

    pub fn entry(&self) -> &LogEntry {
        &self.entry
    }

    pub fn display(&self) -> &RowDisplay {
        &self.display
    }

    /// Receives the entry each time the row reloads.
    pub fn subscribe(&self) -> Receiver<LogEntry> {
        self.changed.subscribe()
    }

    /// Replaces the cached entry and display text, then broadcasts.
    ///
    /// Returns `false` and changes nothing when `entry` has another identity.
    pub fn reload(&mut self, entry: LogEntry) -> bool {
        if entry.id != self.entry.id {
            warn!(
                "event=row_reload module=view_model status=skipped expected_id={} got_id={}",
                self.entry.id, entry.id
            );
            return false;
        }
        self.display = RowDisplay::from_entry(&entry);
        self.entry = entry;
        self.changed.publish(self.entry.clone());
        true
    }
}
