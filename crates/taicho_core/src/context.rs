//! Application context: the store plus the managers that share it.
//!
//! # Responsibility
//! - Open the store and build both data managers from one `CoreConfig`.
//! - Commit through the store, whose observers fan out each commit to the
//!   managers exactly once, in order.

use crate::config::CoreConfig;
use crate::logging::init_logging;
use crate::repo::changes::ContextDidSave;
use crate::repo::entity_store::{EntityStore, StoreResult};
use crate::service::log_entry_manager::LogEntryDataManager;
use crate::service::preset_manager::LogEntryPresetDataManager;

pub struct AppContext {
    store: EntityStore,
    entries: LogEntryDataManager,
    presets: LogEntryPresetDataManager,
}

impl AppContext {
    /// Opens the configured store and wires both managers to it.
    ///
    /// Logging is started first when `config.log_dir` is set; a logging
    /// failure is reported on stderr and does not stop the store from opening.
    pub fn open(config: &CoreConfig) -> StoreResult<Self> {
        if let Some(log_dir) = config.log_dir.as_deref() {
            if let Err(err) = init_logging(&config.log_level, log_dir) {
                eprintln!("taicho: logging disabled: {err}");
            }
        }

        let store = match config.db_path.as_deref() {
            Some(path) => EntityStore::open(path, config.fault_policy)?,
            None => EntityStore::open_in_memory(config.fault_policy)?,
        };
        Ok(Self::with_store(store))
    }

    /// Wires both managers to an already opened store.
    pub fn with_store(store: EntityStore) -> Self {
        let entries = LogEntryDataManager::new(&store);
        let presets = LogEntryPresetDataManager::new(&store);
        Self {
            store,
            entries,
            presets,
        }
    }

    /// Read access for fetches through the managers.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Direct store access. Commits made here reach the managers' channels too.
    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    /// Log entry manager.
    pub fn entries(&self) -> &LogEntryDataManager {
        &self.entries
    }

    /// Preset manager.
    pub fn presets(&self) -> &LogEntryPresetDataManager {
        &self.presets
    }

    /// Split borrow for staging through a manager.
    pub fn entries_and_store(&mut self) -> (&LogEntryDataManager, &mut EntityStore) {
        (&self.entries, &mut self.store)
    }

    /// Split borrow for staging through the preset manager.
    pub fn presets_and_store(&mut self) -> (&LogEntryPresetDataManager, &mut EntityStore) {
        (&self.presets, &mut self.store)
    }

    /// Commits the working context.
    ///
    /// Both managers' channels have received their batches when this returns.
    pub fn save_context(&mut self) -> StoreResult<Option<ContextDidSave>> {
        self.store.save_context()
    }

    /// Discards staged changes without notifying anyone.
    pub fn rollback(&mut self) -> StoreResult<()> {
        self.store.rollback()
    }
}
