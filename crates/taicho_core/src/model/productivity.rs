//! Productivity classification shared by entries and presets.
//!
//! # Invariants
//! - Storage tokens are stable; changing one breaks existing stores.
//! - Display names are for humans only and never persisted.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// How productive a logged activity was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductivityLevel {
    High,
    Medium,
    Low,
    /// Rendered as "Not Productive".
    None,
}

impl ProductivityLevel {
    /// All cases in picker and section order.
    pub const ALL: [ProductivityLevel; 4] = [Self::High, Self::Medium, Self::Low, Self::None];

    /// Stable storage token.
    pub fn token(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::None => "none",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::None => "Not Productive",
        }
    }

    /// Exact storage token match.
    pub fn from_token(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.token() == value)
    }

    /// Exact display name match, the inverse of [`Self::display_name`].
    pub fn from_display_name(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.display_name() == value)
    }
}

impl Display for ProductivityLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Input text matched neither a token nor a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProductivityError(pub String);

impl Display for ParseProductivityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown productivity level `{}`; expected high|medium|low|none",
            self.0
        )
    }
}

impl Error for ParseProductivityError {}

impl FromStr for ProductivityLevel {
    type Err = ParseProductivityError;

    /// Accepts tokens and display names, ignoring ASCII case and outer spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| {
                level.token().eq_ignore_ascii_case(trimmed)
                    || level.display_name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| ParseProductivityError(trimmed.to_string()))
    }
}
