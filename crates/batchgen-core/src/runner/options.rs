//! Runner configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::{GenerationParams, Variant};

/// How the default start index is chosen when neither a forced restart nor
/// an explicit skip count is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResumeStrategy {
    /// Continue one past the last attempted index.
    #[default]
    LastIndex,
    /// Start from the beginning and skip every completed id. Robust to the
    /// source changing order between runs.
    Identity,
}

/// Options for one invocation of the batch runner.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunOptions {
    /// Attempted items after which the run pauses.
    pub batch_size: usize,
    /// Delay between attempted items.
    pub delay: Duration,
    /// Discard prior progress and start at index 0.
    pub force_restart: bool,
    /// Only process the first `test_mode_cap` items.
    pub test_mode: bool,
    /// Size of the test-mode subset.
    pub test_mode_cap: usize,
    /// Explicit start index, overriding the persisted resume point.
    pub skip_first: Option<usize>,
    /// Default resume behaviour.
    pub resume: ResumeStrategy,
    /// Record items whose artifact already exists as completed.
    pub skip_existing: bool,
    /// Directory artifacts are written under.
    pub output_dir: PathBuf,
    /// Requested result shape.
    pub variant: Variant,
    /// Sampling parameters for every request.
    pub params: GenerationParams,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            batch_size: 10,
            delay: Duration::from_secs(2),
            force_restart: false,
            test_mode: false,
            test_mode_cap: 3,
            skip_first: None,
            resume: ResumeStrategy::default(),
            skip_existing: false,
            output_dir: PathBuf::from("output"),
            variant: Variant::default(),
            params: GenerationParams::default(),
        }
    }
}

impl RunOptions {
    /// Computes the `[start, end)` index range for a source of `len` items
    /// whose persisted resume point is `next_index`.
    #[must_use]
    pub fn range(&self, next_index: usize, len: usize) -> (usize, usize) {
        let end = if self.test_mode {
            self.test_mode_cap.min(len)
        } else {
            len
        };

        let start = if self.force_restart {
            0
        } else if let Some(n) = self.skip_first {
            n
        } else {
            match self.resume {
                ResumeStrategy::LastIndex => next_index,
                ResumeStrategy::Identity => 0,
            }
        };

        (start.min(end), end)
    }
}
