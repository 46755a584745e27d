//! History list kept current by splicing committed changes.

use crate::model::log_entry::LogEntry;
use crate::model::EntityId;
use crate::service::log_entry_manager::LogEntryDataManager;
use crate::view_model::log_entry_row::LogEntryRowViewModel;
use std::sync::mpsc::Receiver;

/// What one [`LogEntryListModel::sync`] call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListDelta {
    pub inserted: usize,
    pub reloaded: usize,
    pub removed: usize,
}

impl ListDelta {
    pub fn is_empty(&self) -> bool {
        self.inserted == 0 && self.reloaded == 0 && self.removed == 0
    }
}

/// Rows ordered newest first, updated from the entry manager's channels.
pub struct LogEntryListModel {
    rows: Vec<LogEntryRowViewModel>,
    inserted: Receiver<Vec<LogEntry>>,
    updated: Receiver<Vec<LogEntry>>,
    deleted: Receiver<Vec<EntityId>>,
}

impl LogEntryListModel {
    /// Subscribes to `manager` and shows `entries` as the initial rows.
    pub fn new(manager: &LogEntryDataManager, entries: Vec<LogEntry>) -> Self {
        let changes = manager.changes();
        let mut model = Self {
            rows: Vec::with_capacity(entries.len()),
            inserted: changes.subscribe_inserted(),
            updated: changes.subscribe_updated(),
            deleted: changes.subscribe_deleted(),
        };
        for entry in entries {
            model.splice(entry);
        }
        model
    }

    pub fn rows(&self) -> &[LogEntryRowViewModel] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: EntityId) -> Option<&LogEntryRowViewModel> {
        self.rows.iter().find(|row| row.id() == id)
    }

    /// Applies every batch received since the last call.
    ///
    /// Inserted batches are applied before updated and deleted ones, so an
    /// entry inserted and removed between two syncs ends up absent.
    pub fn sync(&mut self) -> ListDelta {
        let mut delta = ListDelta::default();

        let inserted = self.inserted.try_iter().flatten().collect::<Vec<_>>();
        for entry in inserted {
            if self.splice(entry) {
                delta.inserted += 1;
            } else {
                delta.reloaded += 1;
            }
        }

        let updated = self.updated.try_iter().flatten().collect::<Vec<_>>();
        for entry in updated {
            if self.reload(entry) {
                delta.reloaded += 1;
            }
        }

        let deleted = self.deleted.try_iter().flatten().collect::<Vec<_>>();
        for id in deleted {
            if let Some(index) = self.index_of(id) {
                self.rows.remove(index);
                delta.removed += 1;
            }
        }

        delta
    }

    /// Inserts `entry` in time order; reloads instead when it is already shown.
    fn splice(&mut self, entry: LogEntry) -> bool {
        if self.index_of(entry.id).is_some() {
            self.reload(entry);
            return false;
        }
        let index = self
            .rows
            .iter()
            .position(|row| row.entry().time < entry.time)
            .unwrap_or(self.rows.len());
        self.rows.insert(index, LogEntryRowViewModel::new(entry));
        true
    }

    /// Reloads the matching row, moving it when its time changed.
    fn reload(&mut self, entry: LogEntry) -> bool {
        let Some(index) = self.index_of(entry.id) else {
            return false;
        };
        let time_changed = self.rows[index].entry().time != entry.time;
        self.rows[index].reload(entry);
        if time_changed {
            let row = self.rows.remove(index);
            let target = self
                .rows
                .iter()
                .position(|other| other.entry().time < row.entry().time)
                .unwrap_or(self.rows.len());
            self.rows.insert(target, row);
        }
        true
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }
}
