//! Entity registry and field-to-column mapping tables.
//!
//! # Responsibility
//! - Name every persisted entity kind and its table.
//! - Map typed struct fields to SQLite columns at the serialization boundary.
//!
//! # Invariants
//! - Every table has a text primary key column named [`ID_COLUMN`].
//! - `Entity::to_values` yields values in `EntitySchema::fields` order.

use crate::fault::FaultPolicy;
use crate::model::validation::ValidationError;
use crate::model::EntityId;
use crate::repo::entity_store::StoreResult;
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const ID_COLUMN: &str = "id";

/// Field names accepted by predicates and sort orders.
pub mod field {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const TIME: &str = "time";
    pub const TIMEZONE: &str = "timezone";
    pub const PRODUCTIVITY_LEVEL: &str = "productivity_level";
    pub const NOTES: &str = "notes";
    pub const ICON: &str = "icon";
}

/// One struct field and the column it is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub field: &'static str,
    pub column: &'static str,
}

/// Storage layout of one entity kind.
#[derive(Debug, PartialEq, Eq)]
pub struct EntitySchema {
    pub entity_name: &'static str,
    pub table: &'static str,
    pub fields: &'static [FieldMapping],
}

impl EntitySchema {
    /// Resolves a field name to its column. `id` always resolves.
    pub fn column(&self, field_name: &str) -> Option<&'static str> {
        if field_name == field::ID {
            return Some(ID_COLUMN);
        }
        self.fields
            .iter()
            .find(|mapping| mapping.field == field_name)
            .map(|mapping| mapping.column)
    }

    /// `id` followed by the mapped columns, comma separated.
    pub(crate) fn select_list(&self) -> String {
        std::iter::once(ID_COLUMN)
            .chain(self.fields.iter().map(|mapping| mapping.column))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

static LOG_ENTRY_SCHEMA: EntitySchema = EntitySchema {
    entity_name: "LogEntry",
    table: "log_entries",
    fields: &[
        FieldMapping {
            field: field::NAME,
            column: "name",
        },
        FieldMapping {
            field: field::TIME,
            column: "time_ms",
        },
        FieldMapping {
            field: field::TIMEZONE,
            column: "timezone",
        },
        FieldMapping {
            field: field::PRODUCTIVITY_LEVEL,
            column: "productivity",
        },
        FieldMapping {
            field: field::NOTES,
            column: "notes",
        },
    ],
};

static PRESET_SCHEMA: EntitySchema = EntitySchema {
    entity_name: "LogEntryPreset",
    table: "log_entry_presets",
    fields: &[
        FieldMapping {
            field: field::NAME,
            column: "name",
        },
        FieldMapping {
            field: field::PRODUCTIVITY_LEVEL,
            column: "productivity",
        },
        FieldMapping {
            field: field::ICON,
            column: "icon",
        },
    ],
};

/// Every entity kind the store knows how to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    LogEntry,
    LogEntryPreset,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [Self::LogEntry, Self::LogEntryPreset];

    pub fn schema(self) -> &'static EntitySchema {
        match self {
            Self::LogEntry => &LOG_ENTRY_SCHEMA,
            Self::LogEntryPreset => &PRESET_SCHEMA,
        }
    }

    pub fn entity_name(self) -> &'static str {
        self.schema().entity_name
    }

    pub fn from_entity_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.entity_name() == name)
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.entity_name())
    }
}

/// A typed record the entity store can persist.
pub trait Entity: Clone + 'static {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;

    fn validate(&self) -> Result<(), ValidationError>;

    /// The entity exactly as it will read back from storage.
    ///
    /// Kinds whose columns lose precision override this so that a freshly
    /// created record compares equal to its reloaded copy.
    fn into_stored(self) -> Self {
        self
    }

    /// Column values in `KIND.schema().fields` order, without the id.
    fn to_values(&self) -> Vec<Value>;

    /// Decodes one row selected with `EntitySchema::select_list`.
    ///
    /// Unreadable required fields are `StoreError::InvalidData`; recoverable
    /// faults (an unknown productivity token) go through `faults` instead.
    fn from_row(row: &Row<'_>, faults: FaultPolicy) -> StoreResult<Self>;
}
