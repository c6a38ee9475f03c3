//! Run outcome and summary.

use serde::Serialize;

/// How a run that did not abort ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The batch cap was reached with items left in range.
    Paused {
        /// Index the next invocation resumes from.
        next_index: usize,
    },
    /// The range was exhausted.
    Completed {
        /// Every item in the source is completed.
        all_done: bool,
    },
}

/// Summary of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// First index of the processed range.
    pub start_index: usize,
    /// One past the last index of the processed range.
    pub end_index: usize,
    /// Items that reached the generator.
    pub attempted: usize,
    /// Attempts that produced an artifact.
    pub succeeded: usize,
    /// Attempts that failed.
    pub failed: usize,
    /// Items skipped without a generation call.
    pub skipped: usize,
    /// Completed ids after the run.
    pub completed: usize,
    /// Items in the source.
    pub total: usize,
    /// Whether the run was capped to the test-mode subset.
    pub test_mode: bool,
    /// Saves that failed during the run.
    pub persistence_failures: usize,
}

impl RunReport {
    /// Skip count that resumes past the test-mode subset, if this was a test run.
    #[must_use]
    pub const fn resume_hint(&self) -> Option<usize> {
        if self.test_mode {
            Some(self.end_index)
        } else {
            None
        }
    }

    /// Returns true if every item in the source is completed.
    #[must_use]
    pub const fn all_done(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed { all_done: true })
    }
}
