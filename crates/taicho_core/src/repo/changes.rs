//! Commit notifications and the working-context change ledger.
//!
//! # Invariants
//! - One `ContextDidSave` is published per successful non-empty commit.
//! - Within one working context an id appears in at most one change kind:
//!   insert then update stays inserted, insert then delete vanishes,
//!   update then delete becomes deleted.

use crate::model::EntityId;
use crate::repo::schema::EntityKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Inserted,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 3] = [Self::Inserted, Self::Updated, Self::Deleted];
}

/// Ids of one entity kind affected in one way by one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    pub kind: EntityKind,
    pub change: ChangeKind,
    pub ids: Vec<EntityId>,
}

/// Everything one `save_context` call committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDidSave {
    /// Monotonic per store, starting at 1.
    pub sequence: u64,
    /// Non-empty batches ordered by entity kind, then change kind.
    pub batches: Vec<ChangeBatch>,
}

impl ContextDidSave {
    /// Ids committed for `kind` under `change`; empty when none.
    pub fn ids(&self, kind: EntityKind, change: ChangeKind) -> &[EntityId] {
        self.batches
            .iter()
            .find(|batch| batch.kind == kind && batch.change == change)
            .map(|batch| batch.ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn count(&self, change: ChangeKind) -> usize {
        self.batches
            .iter()
            .filter(|batch| batch.change == change)
            .map(|batch| batch.ids.len())
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LedgerEntry {
    kind: EntityKind,
    id: EntityId,
    change: ChangeKind,
}

/// Staged changes of the open working context, in first-touch order.
#[derive(Debug, Default)]
pub(crate) struct ChangeLedger {
    entries: Vec<LedgerEntry>,
}

impl ChangeLedger {
    pub(crate) fn record_insert(&mut self, kind: EntityKind, id: EntityId) {
        match self.position(kind, id) {
            // A deleted row whose id is inserted again nets out to an update.
            Some(index) if self.entries[index].change == ChangeKind::Deleted => {
                self.entries[index].change = ChangeKind::Updated;
            }
            Some(_) => {}
            None => self.entries.push(LedgerEntry {
                kind,
                id,
                change: ChangeKind::Inserted,
            }),
        }
    }

    pub(crate) fn record_update(&mut self, kind: EntityKind, id: EntityId) {
        if self.position(kind, id).is_none() {
            self.entries.push(LedgerEntry {
                kind,
                id,
                change: ChangeKind::Updated,
            });
        }
    }

    pub(crate) fn record_delete(&mut self, kind: EntityKind, id: EntityId) {
        match self.position(kind, id) {
            Some(index) if self.entries[index].change == ChangeKind::Inserted => {
                self.entries.remove(index);
            }
            Some(index) => self.entries[index].change = ChangeKind::Deleted,
            None => self.entries.push(LedgerEntry {
                kind,
                id,
                change: ChangeKind::Deleted,
            }),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn into_batches(self) -> Vec<ChangeBatch> {
        let mut batches = Vec::new();
        for kind in EntityKind::ALL {
            for change in ChangeKind::ALL {
                let ids = self
                    .entries
                    .iter()
                    .filter(|entry| entry.kind == kind && entry.change == change)
                    .map(|entry| entry.id)
                    .collect::<Vec<_>>();
                if !ids.is_empty() {
                    batches.push(ChangeBatch { kind, change, ids });
                }
            }
        }
        batches
    }

    fn position(&self, kind: EntityKind, id: EntityId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.kind == kind && entry.id == id)
    }
}
