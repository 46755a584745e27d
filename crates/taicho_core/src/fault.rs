//! Integrity fault policy.
//!
//! An integrity fault is persisted state the store cannot interpret: a row of
//! the wrong shape, an unknown productivity token, an unparseable identity.
//! Such faults are programmer or data-corruption errors, not user errors.
//!
//! # Invariants
//! - Every fault is logged before any recovery or abort happens.
//! - `FailFast` never returns from [`FaultPolicy::integrity_fault`].

use log::error;
use serde::{Deserialize, Serialize};

/// How the store reacts to integrity faults found while decoding records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Log, then panic. Surfaces corruption immediately during development.
    FailFast,
    /// Log, then let the caller fall back to a safe default.
    LogAndRecover,
}

impl FaultPolicy {
    /// Returns the policy matching the current build mode.
    ///
    /// - `debug` builds -> `FailFast`
    /// - `release` builds -> `LogAndRecover`
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::FailFast
        } else {
            Self::LogAndRecover
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FailFast => "fail_fast",
            Self::LogAndRecover => "log_and_recover",
        }
    }

    /// Reports one integrity fault.
    ///
    /// Returns only under `LogAndRecover`; the caller is then responsible for
    /// substituting its fallback value.
    pub fn integrity_fault(self, module: &str, detail: &str) {
        error!(
            "event=integrity_fault module={} status=error policy={} detail={}",
            module,
            self.as_str(),
            detail.replace(['\n', '\r'], " ")
        );
        if self == Self::FailFast {
            panic!("integrity fault in {module}: {detail}");
        }
    }
}

impl Default for FaultPolicy {
    fn default() -> Self {
        Self::for_build()
    }
}

#[cfg(test)]
mod tests {
    use super::FaultPolicy;

    #[test]
    fn log_and_recover_returns_to_caller() {
        FaultPolicy::LogAndRecover.integrity_fault("test", "bad token");
    }

    #[test]
    #[should_panic(expected = "integrity fault in test: bad token")]
    fn fail_fast_panics() {
        FaultPolicy::FailFast.integrity_fault("test", "bad token");
    }

    #[test]
    fn build_default_matches_debug_assertions() {
        let expected = if cfg!(debug_assertions) {
            FaultPolicy::FailFast
        } else {
            FaultPolicy::LogAndRecover
        };
        assert_eq!(FaultPolicy::default(), expected);
    }
}
