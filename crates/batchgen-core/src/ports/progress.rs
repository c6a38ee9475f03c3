//! Progress reporting port for UI integration.

use std::time::Duration;

use crate::domain::GeneratedArtifact;
use crate::runner::RunReport;

/// Events emitted by the batch runner.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The resume point has been computed.
    Resumed {
        /// First index of the range.
        start_index: usize,
        /// One past the last index of the range.
        end_index: usize,
        /// Items in the source.
        total: usize,
        /// Items already completed.
        completed: usize,
    },
    /// An attempt started for an item.
    Started {
        /// Item id.
        id: String,
        /// Index in the item list (0-based).
        index: usize,
        /// End of the current range.
        end_index: usize,
        /// Prompt sent to the generator, if any.
        prompt: Option<String>,
    },
    /// An item was skipped without a generation call.
    Skipped {
        /// Item id.
        id: String,
        /// Index in the item list.
        index: usize,
        /// Why it was skipped.
        reason: String,
    },
    /// An item was generated successfully.
    Completed {
        /// Item id.
        id: String,
        /// Index in the item list.
        index: usize,
        /// The produced artifact.
        artifact: GeneratedArtifact,
        /// Completed count used for the percentage.
        done: usize,
        /// Denominator of the percentage (total, or test-mode subset size).
        of: usize,
    },
    /// An item attempt failed; the batch continues.
    Failed {
        /// Item id.
        id: String,
        /// Index in the item list.
        index: usize,
        /// Error description.
        error: String,
    },
    /// Progress could not be persisted; tracking continues in memory.
    PersistenceDegraded {
        /// Error description.
        error: String,
    },
    /// The runner is pacing before the next call.
    Waiting {
        /// Pacing delay.
        delay: Duration,
    },
    /// The run has ended (paused or completed).
    Finished {
        /// Final report.
        report: RunReport,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
