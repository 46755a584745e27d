//! Log entry preset record.

use crate::model::productivity::ProductivityLevel;
use crate::model::validation::ValidationError;
use crate::model::EntityId;
use serde::{Deserialize, Serialize};

/// Longest accepted icon, in chars. Emoji with modifiers span several chars.
pub const MAX_ICON_CHARS: usize = 8;

/// Named template used to create entries quickly.
///
/// Presets only seed field values; entries created from one keep no link to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntryPreset {
    pub id: EntityId,
    /// Unique among presets.
    pub name: String,
    pub productivity_level: ProductivityLevel,
    /// Short glyph shown on the quick-entry tile.
    pub icon: String,
}

impl LogEntryPreset {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        validate_icon(&self.icon)
    }
}

pub(crate) fn validate_icon(icon: &str) -> Result<(), ValidationError> {
    let chars = icon.trim().chars().count();
    if chars == 0 {
        return Err(ValidationError::EmptyIcon);
    }
    if chars > MAX_ICON_CHARS {
        return Err(ValidationError::IconTooLong { chars });
    }
    Ok(())
}
