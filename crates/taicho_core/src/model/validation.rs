//! Field validation for records and user-entered drafts.
//!
//! # Responsibility
//! - Turn raw form text into typed field values.
//! - Produce the alert message shown to the user when input is rejected.
//!
//! # Invariants
//! - Draft validation is pure: nothing is staged or saved on failure, so the
//!   caller keeps the in-progress edit for correction.
//! - `apply_to` mutates the target only after every field has validated.

use crate::clock::parse_user_time;
use crate::model::log_entry::{LogEntry, NewLogEntry};
use crate::model::preset::{validate_icon, LogEntryPreset, MAX_ICON_CHARS};
use crate::model::productivity::ProductivityLevel;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Rejected field value. `Display` yields the user-facing alert text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    InvalidTime(String),
    InvalidProductivity(String),
    MissingProductivity,
    EmptyIcon,
    IconTooLong { chars: usize },
    NilId,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Error! Log must have a name."),
            Self::InvalidTime(_) => write!(f, "Error! Time is invalid."),
            Self::InvalidProductivity(_) => write!(f, "Error! Productivity level is invalid."),
            Self::MissingProductivity => write!(f, "Error! Must specify a productivity level."),
            Self::EmptyIcon => write!(f, "Error! Must pick an icon."),
            Self::IconTooLong { chars } => write!(
                f,
                "Error! Icon is too long ({chars} characters, at most {MAX_ICON_CHARS})."
            ),
            Self::NilId => write!(f, "Error! Record has no identity."),
        }
    }
}

impl Error for ValidationError {}

/// Trims and collapses internal whitespace runs to single spaces.
pub fn normalize_name(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw.trim(), " ").into_owned()
}

/// Raw log entry form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntryDraft {
    pub name: String,
    /// `YYYY-MM-DD HH:MM` in the draft zone, or RFC 3339.
    pub time: String,
    /// Token or display name.
    pub productivity: String,
    pub notes: Option<String>,
}

impl LogEntryDraft {
    /// Validates the draft for creating a new entry in `timezone`.
    pub fn validate(&self, timezone: Tz) -> Result<NewLogEntry, ValidationError> {
        let fields = self.parse_fields(timezone)?;
        Ok(NewLogEntry {
            name: fields.name,
            productivity_level: fields.productivity_level,
            time: Some(fields.time),
            timezone: Some(timezone),
            notes: fields.notes,
        })
    }

    /// Writes the draft into an existing entry, keeping its id and zone.
    pub fn apply_to(&self, entry: &mut LogEntry) -> Result<(), ValidationError> {
        let fields = self.parse_fields(entry.timezone)?;
        entry.name = fields.name;
        entry.time = fields.time;
        entry.productivity_level = fields.productivity_level;
        entry.notes = fields.notes;
        Ok(())
    }

    fn parse_fields(&self, timezone: Tz) -> Result<EntryFields, ValidationError> {
        let name = normalize_name(&self.name);
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let time = parse_user_time(&self.time, timezone)
            .ok_or_else(|| ValidationError::InvalidTime(self.time.clone()))?;
        let productivity_level = self
            .productivity
            .parse::<ProductivityLevel>()
            .map_err(|_| ValidationError::InvalidProductivity(self.productivity.clone()))?;
        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_string);

        Ok(EntryFields {
            name,
            time,
            productivity_level,
            notes,
        })
    }
}

struct EntryFields {
    name: String,
    time: DateTime<Utc>,
    productivity_level: ProductivityLevel,
    notes: Option<String>,
}

/// Raw preset form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetDraft {
    pub name: String,
    pub productivity: String,
    pub icon: String,
}

/// Validated preset fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPreset {
    pub name: String,
    pub productivity_level: ProductivityLevel,
    pub icon: String,
}

impl PresetDraft {
    pub fn validate(&self) -> Result<NewPreset, ValidationError> {
        let name = normalize_name(&self.name);
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let productivity_level = self
            .productivity
            .parse::<ProductivityLevel>()
            .map_err(|_| ValidationError::MissingProductivity)?;
        let icon = self.icon.trim().to_string();
        validate_icon(&icon)?;

        Ok(NewPreset {
            name,
            productivity_level,
            icon,
        })
    }

    pub fn apply_to(&self, preset: &mut LogEntryPreset) -> Result<(), ValidationError> {
        let fields = self.validate()?;
        preset.name = fields.name;
        preset.productivity_level = fields.productivity_level;
        preset.icon = fields.icon;
        Ok(())
    }
}
