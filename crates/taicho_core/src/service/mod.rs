//! Data managers: typed use-case APIs over the entity store.
//!
//! # Responsibility
//! - Orchestrate store calls into entry and preset operations.
//! - Keep CLI and view-model callers decoupled from SQL and schema details.

pub mod data_manager;
pub mod log_entry_manager;
pub mod preset_manager;
