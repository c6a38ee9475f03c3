//! Mock implementations of core port traits.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use batchgen_core::{
    ArtifactGenerator, ArtifactLocation, ArtifactRequest, GeneratedArtifact, GenerationError,
    OutputNaming, Pacer, ParseError, PersistenceError, ProgressEvent, ProgressSink, ProgressState,
    ProgressStore, RunReport, Variant, WorkItem, WorkSource,
};

/// Mock implementation of `WorkSource` for testing.
///
/// Yields pre-built items; an empty list yields `ParseError::Empty` like a
/// real source would.
pub struct MockWorkSource {
    items: Vec<WorkItem>,
    fail: bool,
    extract_count: Mutex<usize>,
}

impl MockWorkSource {
    /// Creates a new mock source with the given items.
    #[must_use]
    pub const fn new(items: Vec<WorkItem>) -> Self {
        Self {
            items,
            fail: false,
            extract_count: Mutex::new(0),
        }
    }

    /// Creates a source whose extraction always fails as malformed.
    #[must_use]
    pub const fn failing() -> Self {
        Self {
            items: Vec::new(),
            fail: true,
            extract_count: Mutex::new(0),
        }
    }

    /// Returns the number of times the source has been extracted.
    #[must_use]
    pub fn extract_count(&self) -> usize {
        *self
            .extract_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl WorkSource for MockWorkSource {
    fn extract(&self) -> Result<Vec<WorkItem>, ParseError> {
        *self
            .extract_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;

        if self.fail {
            return Err(ParseError::Malformed {
                path: PathBuf::from("mock://source"),
                reason: "simulated parse failure".to_string(),
            });
        }
        if self.items.is_empty() {
            return Err(ParseError::Empty {
                path: PathBuf::from("mock://source"),
            });
        }
        Ok(self.items.clone())
    }

    fn describe(&self) -> String {
        "mock://source".to_string()
    }
}

/// In-memory `ProgressStore` with failure injection.
#[derive(Default)]
pub struct MockProgressStore {
    state: Mutex<Option<ProgressState>>,
    failing_calls: HashSet<usize>,
    save_attempts: Mutex<usize>,
    fail_load: bool,
    save_count: Mutex<usize>,
    reset_count: Mutex<usize>,
}

impl MockProgressStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `state`, as if left by a previous run.
    #[must_use]
    pub fn with_state(state: ProgressState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            ..Self::default()
        }
    }

    /// Makes `load` fail as if the file were corrupt.
    #[must_use]
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// Makes the first `count` saves fail.
    #[must_use]
    pub fn failing_saves(mut self, count: usize) -> Self {
        self.failing_calls.extend(1..=count);
        self
    }

    /// Makes the given save calls fail (1-based, counting every attempt).
    #[must_use]
    pub fn failing_save_calls(mut self, calls: &[usize]) -> Self {
        self.failing_calls.extend(calls.iter().copied());
        self
    }

    /// Returns the last successfully saved state.
    #[must_use]
    pub fn state(&self) -> Option<ProgressState> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.save_count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the number of resets.
    #[must_use]
    pub fn reset_count(&self) -> usize {
        *self
            .reset_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProgressStore for MockProgressStore {
    fn load(&self) -> Result<ProgressState, PersistenceError> {
        if self.fail_load {
            return Err(PersistenceError::Corrupt {
                path: PathBuf::from("mock://progress"),
                reason: "simulated corruption".to_string(),
            });
        }
        Ok(self.state().unwrap_or_default())
    }

    fn save(&self, state: &ProgressState) -> Result<(), PersistenceError> {
        let attempt = {
            let mut attempts = self
                .save_attempts
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *attempts += 1;
            *attempts
        };
        if self.failing_calls.contains(&attempt) {
            return Err(PersistenceError::Write {
                path: PathBuf::from("mock://progress"),
                source: std::io::Error::other("simulated write failure"),
            });
        }

        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = Some(state.clone());
        *self.save_count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }

    fn reset(&self) -> Result<(), PersistenceError> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = None;
        *self
            .reset_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

/// Mock implementation of `ArtifactGenerator` for testing.
///
/// Succeeds for every item except the ones registered with `failing_on`,
/// and records every request it receives.
pub struct MockGenerator {
    failing: HashSet<String>,
    unreachable: bool,
    write_files: bool,
    naming: OutputNaming,
    requests: Mutex<Vec<ArtifactRequest>>,
}

impl MockGenerator {
    /// Creates a generator with a flat `.png` layout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            failing: HashSet::new(),
            unreachable: false,
            write_files: false,
            naming: OutputNaming::flat(".png"),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fails every attempt for `id` with a generation error.
    #[must_use]
    pub fn failing_on(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Fails every attempt with a connection error.
    #[must_use]
    pub const fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Writes a small file at each destination on success.
    #[must_use]
    pub const fn writing_files(mut self) -> Self {
        self.write_files = true;
        self
    }

    /// Uses the given output layout.
    #[must_use]
    pub fn with_naming(mut self, naming: OutputNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Returns all requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ArtifactRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the item ids requested, in call order.
    #[must_use]
    pub fn requested_ids(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.item_id).collect()
    }

    /// Returns the number of generate calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactGenerator for MockGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn output_naming(&self, _variant: Variant) -> OutputNaming {
        self.naming.clone()
    }

    fn generate(&self, request: &ArtifactRequest) -> Result<GeneratedArtifact, GenerationError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if self.unreachable {
            return Err(GenerationError::Connection(
                "simulated unreachable service".to_string(),
            ));
        }
        if self.failing.contains(&request.item_id) {
            return Err(GenerationError::Generation(format!(
                "simulated failure for {}",
                request.item_id
            )));
        }

        if self.write_files {
            if let Some(parent) = request.destination.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| GenerationError::Generation(e.to_string()))?;
            }
            std::fs::write(&request.destination, request.item_id.as_bytes())
                .map_err(|e| GenerationError::Generation(e.to_string()))?;
        }

        Ok(GeneratedArtifact {
            kind: request.variant,
            location: ArtifactLocation {
                source: request.destination.clone(),
                output: request.destination.clone(),
            },
        })
    }
}

/// `Pacer` that records delays instead of sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    /// Creates a new recording pacer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded pauses.
    #[must_use]
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, delay: Duration) {
        self.pauses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(delay);
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn count(&self, pred: impl Fn(&ProgressEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Started { .. }))
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Completed { .. }))
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Skipped { .. }))
    }

    /// Returns the number of `Failed` events.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Failed { .. }))
    }

    /// Returns the number of `PersistenceDegraded` events.
    #[must_use]
    pub fn degraded_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::PersistenceDegraded { .. }))
    }

    /// Returns the `(done, of)` pairs of all `Completed` events.
    #[must_use]
    pub fn percentages(&self) -> Vec<(usize, usize)> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Completed { done, of, .. } => Some((*done, *of)),
                _ => None,
            })
            .collect()
    }

    /// Returns the report from the `Finished` event, if any.
    #[must_use]
    pub fn finished_report(&self) -> Option<RunReport> {
        self.events().into_iter().find_map(|e| match e {
            ProgressEvent::Finished { report } => Some(report),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
