//! Domain model for the activity log.
//!
//! # Responsibility
//! - Define the entry and preset records plus the productivity scale.
//! - Validate record fields and user-entered drafts.
//!
//! # Invariants
//! - Every record is identified by a stable, store-assigned `EntityId`.
//! - Entries and presets never reference each other.

pub mod log_entry;
pub mod preset;
pub mod productivity;
pub mod validation;

use uuid::Uuid;

/// Store-assigned record identity. Never reused after deletion.
pub type EntityId = Uuid;
