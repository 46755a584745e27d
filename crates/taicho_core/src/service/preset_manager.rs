//! Log entry preset data manager.

use crate::model::preset::LogEntryPreset;
use crate::model::productivity::ProductivityLevel;
use crate::model::validation::NewPreset;
use crate::model::EntityId;
use crate::repo::entity_store::{EntityStore, StoreResult};
use crate::repo::query::{Predicate, SortOrder};
use crate::repo::schema::field;
use crate::service::data_manager::EntityDataManager;

pub struct LogEntryPresetDataManager {
    presets: EntityDataManager<LogEntryPreset>,
}

impl LogEntryPresetDataManager {
    /// Creates the manager and registers its change channels with `store`.
    pub fn new(store: &EntityStore) -> Self {
        Self {
            presets: EntityDataManager::new(store),
        }
    }

    /// Change channels for presets.
    pub fn changes(&self) -> &EntityDataManager<LogEntryPreset> {
        &self.presets
    }

    /// Stages a new preset with the given field values.
    ///
    /// # Errors
    /// - `StoreError::Validation` for a blank name or an empty or overlong icon.
    /// - `StoreError::Constraint` when another preset already has `name`.
    pub fn create(
        &self,
        store: &mut EntityStore,
        name: &str,
        productivity_level: ProductivityLevel,
        icon: &str,
    ) -> StoreResult<LogEntryPreset> {
        self.presets.create_with(store, |id| LogEntryPreset {
            id,
            name: name.to_string(),
            productivity_level,
            icon: icon.to_string(),
        })
    }

    /// Stages a preset from validated form input.
    pub fn create_validated(
        &self,
        store: &mut EntityStore,
        new_preset: &NewPreset,
    ) -> StoreResult<LogEntryPreset> {
        self.create(
            store,
            &new_preset.name,
            new_preset.productivity_level,
            &new_preset.icon,
        )
    }

    /// Preset by id; `None` when absent.
    pub fn get(&self, store: &EntityStore, id: EntityId) -> Option<LogEntryPreset> {
        self.presets.get(store, id)
    }

    /// All presets ordered by name.
    pub fn get_all(&self, store: &EntityStore) -> Vec<LogEntryPreset> {
        self.presets
            .fetch(store, None, Some(&SortOrder::ascending(field::NAME)))
    }

    /// Preset whose name equals `name` exactly.
    pub fn find_by_name(&self, store: &EntityStore, name: &str) -> Option<LogEntryPreset> {
        let predicate = Predicate::equals(field::NAME, name.to_string());
        self.presets
            .fetch(store, Some(&predicate), None)
            .into_iter()
            .next()
    }

    /// Stages new field values for `preset`.
    ///
    /// Entries created from the preset earlier keep their own values.
    pub fn update(&self, store: &mut EntityStore, preset: &LogEntryPreset) -> StoreResult<()> {
        self.presets.update(store, preset)
    }

    /// Stages removal of `presets`. Entries created from them are untouched.
    pub fn delete(&self, store: &mut EntityStore, presets: &[LogEntryPreset]) -> StoreResult<()> {
        self.presets.delete(store, presets)
    }
}
