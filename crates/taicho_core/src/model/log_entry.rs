//! Log entry record.

use crate::model::productivity::ProductivityLevel;
use crate::model::validation::ValidationError;
use crate::model::EntityId;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One recorded activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntityId,
    /// Human-readable activity name. Never blank.
    pub name: String,
    /// When the activity began.
    pub time: DateTime<Utc>,
    /// Zone active when the entry was created; used for display and export.
    pub timezone: Tz,
    pub productivity_level: ProductivityLevel,
    pub notes: Option<String>,
}

impl LogEntry {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    /// Time rendered in the entry's own zone.
    pub fn local_time(&self) -> DateTime<Tz> {
        self.time.with_timezone(&self.timezone)
    }
}

/// Field values for a new entry. Unset optional fields take manager defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
    pub name: String,
    pub productivity_level: ProductivityLevel,
    /// Defaults to now, rounded down to the quarter hour.
    pub time: Option<DateTime<Utc>>,
    /// Defaults to the device zone.
    pub timezone: Option<Tz>,
    pub notes: Option<String>,
}

impl NewLogEntry {
    pub fn new(name: impl Into<String>, productivity_level: ProductivityLevel) -> Self {
        Self {
            name: name.into(),
            productivity_level,
            time: None,
            timezone: None,
            notes: None,
        }
    }

    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn in_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = Some(timezone);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
