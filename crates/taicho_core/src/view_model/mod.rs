//! View models that keep displayed rows current from change channels.
//!
//! # Responsibility
//! - Match committed change batches to live rows by identity.
//! - Reload and re-broadcast rows instead of re-querying the store.
//!
//! # Invariants
//! - Rows are keyed by `EntityId`; field equality never identifies a row.

pub mod log_entry_list;
pub mod log_entry_row;
pub mod preset_option;
