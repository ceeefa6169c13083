//! Dispatch statistics.
//!
//! Counters are updated once per dispatch, when its outcome is known.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::domain::DispatchOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchCounts {
    pub rejected: u64,
    pub not_found: u64,
    pub lookup_failed: u64,
    pub executed: u64,
    pub execution_failed: u64,
}

#[derive(Debug, Default)]
pub struct DispatchStats {
    rejected: AtomicU64,
    not_found: AtomicU64,
    lookup_failed: AtomicU64,
    executed: AtomicU64,
    execution_failed: AtomicU64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: DispatchOutcome) {
        let counter = match outcome {
            DispatchOutcome::Rejected => &self.rejected,
            DispatchOutcome::NotFound => &self.not_found,
            DispatchOutcome::LookupFailed => &self.lookup_failed,
            DispatchOutcome::Executed => &self.executed,
            DispatchOutcome::ExecutionFailed => &self.execution_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchCounts {
        DispatchCounts {
            rejected: self.rejected.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            lookup_failed: self.lookup_failed.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            execution_failed: self.execution_failed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_counts_each_outcome() {
        let stats = DispatchStats::new();
        stats.record(DispatchOutcome::Executed);
        stats.record(DispatchOutcome::Executed);
        stats.record(DispatchOutcome::NotFound);

        assert_eq!(
            stats.snapshot(),
            DispatchCounts {
                executed: 2,
                not_found: 1,
                ..DispatchCounts::default()
            }
        );
    }
}
