//! Core configuration.
//!
//! # Responsibility
//! - Describe where the store lives, how logging is set up and which
//!   integrity fault policy applies.
//! - Provide build-mode aware defaults so callers only override what they need.

use crate::fault::FaultPolicy;
use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Store file name used when a caller picks a directory but no file.
pub const DEFAULT_DB_FILE_NAME: &str = "taicho.sqlite3";

/// Startup configuration consumed by [`crate::AppContext::open`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Store file path. `None` opens a throwaway in-memory store.
    pub db_path: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute log directory. `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
    pub fault_policy: FaultPolicy,
}

impl CoreConfig {
    /// Configuration for an in-memory store with build defaults.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Configuration for a file-backed store with build defaults.
    pub fn with_db_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            ..Self::default()
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            fault_policy: FaultPolicy::for_build(),
        }
    }
}
