//! Outcome model: the terminal state of a dispatch.
//!
//! `NotFound` is a normal outcome, not a failure. It is kept apart from
//! `LookupFailed` so callers can tell "nothing bound" from "registry broke".

use serde::{Deserialize, Serialize};

/// Serialized as SCREAMING_SNAKE_CASE (e.g. `"NOT_FOUND"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchOutcome {
    /// The event or the resolved task was malformed; nothing ran.
    Rejected,
    /// No task is bound to the action.
    NotFound,
    /// The registry call failed.
    LookupFailed,
    /// The engine ran the script successfully.
    Executed,
    /// The engine ran (or tried to run) the script and it failed.
    ExecutionFailed,
}

impl DispatchOutcome {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::Rejected
                | DispatchOutcome::LookupFailed
                | DispatchOutcome::ExecutionFailed
        )
    }
}

/// What the engine reports back after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Number of completed runs (see `RepeatPolicy::loop_times`).
    pub runs: u32,
}

impl ExecutionReport {
    pub fn single() -> Self {
        Self { runs: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_as_screaming_snake_case() {
        let s = serde_json::to_string(&DispatchOutcome::NotFound).unwrap();
        assert_eq!(s, "\"NOT_FOUND\"");

        let s = serde_json::to_string(&DispatchOutcome::ExecutionFailed).unwrap();
        assert_eq!(s, "\"EXECUTION_FAILED\"");
    }

    #[test]
    fn not_found_is_not_an_error() {
        assert!(!DispatchOutcome::NotFound.is_error());
        assert!(!DispatchOutcome::Executed.is_error());
        assert!(DispatchOutcome::LookupFailed.is_error());
        assert!(DispatchOutcome::Rejected.is_error());
    }
}
