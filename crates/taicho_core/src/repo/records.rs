//! Row encoding and decoding for the persisted entity kinds.
//!
//! # Invariants
//! - Read paths reject rows whose identity, time or zone cannot be read.
//! - An unknown productivity token is reported through the fault policy and
//!   decodes to `ProductivityLevel::None`.

use crate::fault::FaultPolicy;
use crate::model::log_entry::LogEntry;
use crate::model::preset::LogEntryPreset;
use crate::model::productivity::ProductivityLevel;
use crate::model::validation::ValidationError;
use crate::model::EntityId;
use crate::repo::entity_store::{StoreError, StoreResult};
use crate::repo::schema::{Entity, EntityKind, ID_COLUMN};
use chrono::{DateTime, SubsecRound};
use chrono_tz::Tz;
use rusqlite::types::{FromSql, Value};
use rusqlite::Row;
use uuid::Uuid;

impl Entity for LogEntry {
    const KIND: EntityKind = EntityKind::LogEntry;

    fn id(&self) -> EntityId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        LogEntry::validate(self)
    }

    /// `time_ms` keeps whole milliseconds.
    fn into_stored(mut self) -> Self {
        self.time = self.time.trunc_subsecs(3);
        self
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Integer(self.time.timestamp_millis()),
            Value::Text(self.timezone.name().to_string()),
            Value::Text(self.productivity_level.token().to_string()),
            self.notes.clone().map_or(Value::Null, Value::Text),
        ]
    }

    fn from_row(row: &Row<'_>, faults: FaultPolicy) -> StoreResult<Self> {
        let id = read_id(row, Self::KIND)?;

        let time_ms: i64 = read(row, Self::KIND, "time_ms")?;
        let time = DateTime::from_timestamp_millis(time_ms).ok_or_else(|| {
            StoreError::InvalidData(format!("time `{time_ms}` out of range in log_entries.time_ms"))
        })?;

        let timezone_text: String = read(row, Self::KIND, "timezone")?;
        let timezone = timezone_text.parse::<Tz>().map_err(|_| {
            StoreError::InvalidData(format!(
                "invalid timezone `{timezone_text}` in log_entries.timezone"
            ))
        })?;

        let token: String = read(row, Self::KIND, "productivity")?;

        Ok(LogEntry {
            id,
            name: read(row, Self::KIND, "name")?,
            time,
            timezone,
            productivity_level: decode_productivity(&token, Self::KIND, faults),
            notes: read(row, Self::KIND, "notes")?,
        })
    }
}

impl Entity for LogEntryPreset {
    const KIND: EntityKind = EntityKind::LogEntryPreset;

    fn id(&self) -> EntityId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        LogEntryPreset::validate(self)
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.productivity_level.token().to_string()),
            Value::Text(self.icon.clone()),
        ]
    }

    fn from_row(row: &Row<'_>, faults: FaultPolicy) -> StoreResult<Self> {
        let token: String = read(row, Self::KIND, "productivity")?;

        Ok(LogEntryPreset {
            id: read_id(row, Self::KIND)?,
            name: read(row, Self::KIND, "name")?,
            productivity_level: decode_productivity(&token, Self::KIND, faults),
            icon: read(row, Self::KIND, "icon")?,
        })
    }
}

fn read<T: FromSql>(row: &Row<'_>, kind: EntityKind, column: &str) -> StoreResult<T> {
    row.get::<_, T>(column).map_err(|err| {
        StoreError::InvalidData(format!(
            "unreadable column {}.{column}: {err}",
            kind.schema().table
        ))
    })
}

fn read_id(row: &Row<'_>, kind: EntityKind) -> StoreResult<EntityId> {
    let text: String = read(row, kind, ID_COLUMN)?;
    Uuid::parse_str(&text).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid id `{text}` in {}.{ID_COLUMN}",
            kind.schema().table
        ))
    })
}

fn decode_productivity(token: &str, kind: EntityKind, faults: FaultPolicy) -> ProductivityLevel {
    ProductivityLevel::from_token(token).unwrap_or_else(|| {
        faults.integrity_fault(
            "store",
            &format!(
                "unknown productivity token `{token}` in {}.productivity",
                kind.schema().table
            ),
        );
        ProductivityLevel::None
    })
}
