//! Core of the Taicho activity log.
//!
//! Records what a person did, when, and how productive it felt, and keeps
//! displayed lists in sync with committed changes.

pub mod clock;
pub mod config;
pub mod context;
pub mod db;
pub mod export;
pub mod fault;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;
pub mod view_model;

pub use config::CoreConfig;
pub use context::AppContext;
pub use export::{export_csv, write_csv, ExportError};
pub use fault::FaultPolicy;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::log_entry::{LogEntry, NewLogEntry};
pub use model::preset::LogEntryPreset;
pub use model::productivity::ProductivityLevel;
pub use model::validation::{LogEntryDraft, PresetDraft, ValidationError};
pub use model::EntityId;
pub use repo::changes::{ChangeKind, ContextDidSave};
pub use repo::entity_store::{EntityStore, StoreError, StoreResult};
pub use service::log_entry_manager::{LogEntryDataManager, LogEntrySearch};
pub use service::preset_manager::LogEntryPresetDataManager;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
