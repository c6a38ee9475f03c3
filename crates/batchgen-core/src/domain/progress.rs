//! Durable progress record.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Persisted progress of a batch job.
///
/// Serialized as `{"completed": [...], "total": n, "last_index": i}`. An
/// empty state has `last_index == -1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Ids of items processed successfully, in completion order.
    #[serde(default)]
    pub completed: Vec<String>,
    /// Number of items in the source at the last run.
    #[serde(default)]
    pub total: usize,
    /// Highest list index attempted, `-1` before any attempt.
    #[serde(default = "no_index")]
    pub last_index: i64,
}

const fn no_index() -> i64 {
    -1
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            completed: Vec::new(),
            total: 0,
            last_index: no_index(),
        }
    }
}

impl ProgressState {
    /// Returns true if `id` has been completed.
    #[must_use]
    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.iter().any(|c| c == id)
    }

    /// Records `id` as completed. Returns false if it already was.
    pub fn mark_completed(&mut self, id: &str) -> bool {
        if self.is_completed(id) {
            return false;
        }
        self.completed.push(id.to_string());
        true
    }

    /// Records an attempt at `index`, never moving `last_index` backwards.
    pub fn mark_attempted(&mut self, index: usize) {
        let index = i64::try_from(index).unwrap_or(i64::MAX);
        if index > self.last_index {
            self.last_index = index;
        }
    }

    /// Default resume point: one past the last attempted index.
    #[must_use]
    pub fn next_index(&self) -> usize {
        usize::try_from(self.last_index + 1).unwrap_or(0)
    }

    /// Number of completed ids.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Removes duplicate ids that a hand-edited file may contain.
    pub fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.completed.retain(|id| seen.insert(id.clone()));
    }
}
