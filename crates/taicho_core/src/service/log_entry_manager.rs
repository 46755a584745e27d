//! Log entry data manager.
//!
//! # Responsibility
//! - Create entries directly or from a preset, applying time and zone
//!   defaults.
//! - Search entries by name and calendar day.
//!
//! # Invariants
//! - Default times are rounded down to the quarter hour.
//! - Name search is a case-sensitive substring match.
//! - Day search is the half-open interval `[start_of_day, start_of_next_day)`
//!   in the search zone.

use crate::clock::{current_timezone, day_bounds, now_rounded};
use crate::model::log_entry::{LogEntry, NewLogEntry};
use crate::model::preset::LogEntryPreset;
use crate::model::EntityId;
use crate::repo::entity_store::{EntityStore, StoreResult};
use crate::repo::query::{Predicate, SortOrder};
use crate::repo::schema::field;
use crate::service::data_manager::EntityDataManager;
use chrono::NaiveDate;
use chrono_tz::Tz;
use log::error;

/// Filters for [`LogEntryDataManager::search`]. Unset filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntrySearch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    /// Zone whose calendar defines `date`. Defaults to the device zone.
    pub timezone: Option<Tz>,
}

impl LogEntrySearch {
    pub fn name(mut self, needle: impl Into<String>) -> Self {
        self.name = Some(needle.into());
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn in_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = Some(timezone);
        self
    }
}

pub struct LogEntryDataManager {
    entries: EntityDataManager<LogEntry>,
}

impl LogEntryDataManager {
    /// Creates the manager and registers its change channels with `store`.
    pub fn new(store: &EntityStore) -> Self {
        Self {
            entries: EntityDataManager::new(store),
        }
    }

    /// Change channels for log entries.
    pub fn changes(&self) -> &EntityDataManager<LogEntry> {
        &self.entries
    }

    /// Stages a new entry; unset time and zone take the current defaults.
    ///
    /// Field values are stored as given. Time keeps whole milliseconds.
    ///
    /// # Errors
    /// - `StoreError::Validation` when the name is blank.
    pub fn create(&self, store: &mut EntityStore, new_entry: NewLogEntry) -> StoreResult<LogEntry> {
        let time = new_entry.time.unwrap_or_else(now_rounded);
        let timezone = new_entry.timezone.unwrap_or_else(current_timezone);
        self.entries.create_with(store, |id| LogEntry {
            id,
            name: new_entry.name,
            time,
            timezone,
            productivity_level: new_entry.productivity_level,
            notes: new_entry.notes,
        })
    }

    /// Stages an entry starting now with the preset's name and productivity.
    pub fn create_from_preset(
        &self,
        store: &mut EntityStore,
        preset: &LogEntryPreset,
    ) -> StoreResult<LogEntry> {
        self.create(
            store,
            NewLogEntry::new(preset.name.clone(), preset.productivity_level),
        )
    }

    /// Entry by id, including staged changes; `None` when absent.
    pub fn get(&self, store: &EntityStore, id: EntityId) -> Option<LogEntry> {
        self.entries.get(store, id)
    }

    /// All entries. Ordered newest first for display, not as a contract.
    pub fn get_all(&self, store: &EntityStore) -> Vec<LogEntry> {
        self.entries
            .fetch(store, None, Some(&SortOrder::descending(field::TIME)))
    }

    /// Entries matching every supplied filter, newest first.
    ///
    /// Logs and returns an empty list when the day bounds cannot be computed.
    pub fn search(&self, store: &EntityStore, search: &LogEntrySearch) -> Vec<LogEntry> {
        let mut filters = Vec::new();

        if let Some(needle) = search.name.as_deref().filter(|needle| !needle.is_empty()) {
            filters.push(Predicate::contains(field::NAME, needle));
        }

        if let Some(date) = search.date {
            let timezone = search.timezone.unwrap_or_else(current_timezone);
            let Some((start, end)) = day_bounds(date, timezone) else {
                error!(
                    "event=entry_search module=log_entry_manager status=error error_code=day_bounds_failed date={} timezone={}",
                    date,
                    timezone.name()
                );
                return Vec::new();
            };
            filters.push(Predicate::range(
                field::TIME,
                start.timestamp_millis(),
                end.timestamp_millis(),
            ));
        }

        self.entries.fetch(
            store,
            Some(&Predicate::And(filters)),
            Some(&SortOrder::descending(field::TIME)),
        )
    }

    /// Stages new field values for `entry`.
    pub fn update(&self, store: &mut EntityStore, entry: &LogEntry) -> StoreResult<()> {
        self.entries.update(store, entry)
    }

    /// Stages removal of `entries`.
    pub fn delete(&self, store: &mut EntityStore, entries: &[LogEntry]) -> StoreResult<()> {
        self.entries.delete(store, entries)
    }
}
