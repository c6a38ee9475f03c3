//! Resumable batch runner.
//!
//! Drives one invocation of a batch job through
//! `Idle -> Resuming -> Iterating -> (Paused | Completed | Aborted)`:
//! - extracts the item list and loads persisted progress
//! - computes the start index (forced restart, skip count or resume point)
//! - generates items one at a time, persisting progress after every attempt
//! - paces calls and stops after `batch_size` attempts
//!
//! Per-item failures are recorded and never stop the batch. Only an unusable
//! source or progress store aborts a run.

mod options;
mod report;

use std::fmt;

use tracing::{debug, info, warn};

pub use options::{ResumeStrategy, RunOptions};
pub use report::{RunOutcome, RunReport};

use crate::domain::{ArtifactRequest, ProgressState, WorkItem};
use crate::error::RunError;
use crate::naming::sanitize_name;
use crate::ports::{
    ArtifactGenerator, Pacer, ProgressEvent, ProgressSink, ProgressStore, ThreadPacer, WorkSource,
};

/// Lifecycle phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Resuming,
    Iterating,
    Paused,
    Completed,
    Aborted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Resuming => "resuming",
            Self::Iterating => "iterating",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Per-run counters.
#[derive(Debug, Default)]
struct Tally {
    attempted: usize,
    succeeded: usize,
    failed: usize,
    skipped: usize,
    persistence_failures: usize,
    degraded: bool,
}

/// Orchestrates extraction, progress, naming, generation and pacing.
pub struct BatchRunner<'a> {
    source: &'a dyn WorkSource,
    store: &'a dyn ProgressStore,
    generator: &'a dyn ArtifactGenerator,
    sink: &'a dyn ProgressSink,
    pacer: &'a dyn Pacer,
    options: RunOptions,
}

impl<'a> BatchRunner<'a> {
    /// Creates a runner that paces with [`ThreadPacer`].
    #[must_use]
    pub fn new(
        source: &'a dyn WorkSource,
        store: &'a dyn ProgressStore,
        generator: &'a dyn ArtifactGenerator,
        sink: &'a dyn ProgressSink,
        options: RunOptions,
    ) -> Self {
        Self {
            source,
            store,
            generator,
            sink,
            pacer: &ThreadPacer,
            options,
        }
    }

    /// Replaces the pacer.
    #[must_use]
    pub fn with_pacer(mut self, pacer: &'a dyn Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Runs one invocation of the batch job.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] when the run aborts: the source cannot be
    /// extracted, the progress store cannot be loaded or initialized, or the
    /// output directory cannot be created.
    pub fn run(&self) -> Result<RunReport, RunError> {
        let mut phase = Phase::Idle;
        match self.execute(&mut phase) {
            Ok(report) => Ok(report),
            Err(e) => {
                transition(&mut phase, Phase::Aborted);
                Err(e)
            }
        }
    }

    fn execute(&self, phase: &mut Phase) -> Result<RunReport, RunError> {
        let items = self.source.extract()?;
        info!("Found {} items in {}", items.len(), self.source.describe());

        transition(phase, Phase::Resuming);
        let mut progress = self.resume_state(items.len())?;
        let (start_index, end_index) = self
            .options
            .range(progress.next_index(), items.len());

        std::fs::create_dir_all(&self.options.output_dir).map_err(|source| {
            RunError::OutputDir {
                path: self.options.output_dir.clone(),
                source,
            }
        })?;

        info!(
            start_index,
            end_index,
            completed = progress.completed_count(),
            "Resuming batch"
        );
        self.sink.on_event(ProgressEvent::Resumed {
            start_index,
            end_index,
            total: items.len(),
            completed: progress.completed_count(),
        });

        transition(phase, Phase::Iterating);
        let mut tally = Tally::default();
        let mut outcome = None;

        for index in start_index..end_index {
            let item = &items[index];

            if progress.is_completed(&item.id) {
                debug!("Skipping already processed item: {}", item.id);
                self.sink.on_event(ProgressEvent::Skipped {
                    id: item.id.clone(),
                    index,
                    reason: "already completed".to_string(),
                });
                tally.skipped += 1;
                continue;
            }

            if self.adopt_existing(item, index, &mut progress, &mut tally) {
                continue;
            }

            self.attempt(item, index, end_index, &items, &mut progress, &mut tally);

            let has_more = index + 1 < end_index;
            if tally.attempted >= self.options.batch_size && has_more {
                info!(
                    "Completed batch of {} items, pausing",
                    self.options.batch_size
                );
                outcome = Some(RunOutcome::Paused {
                    next_index: progress.next_index(),
                });
                break;
            }

            if has_more && !self.options.delay.is_zero() {
                self.sink.on_event(ProgressEvent::Waiting {
                    delay: self.options.delay,
                });
                self.pacer.pause(self.options.delay);
            }
        }

        let outcome = outcome.unwrap_or_else(|| RunOutcome::Completed {
            all_done: items.iter().all(|item| progress.is_completed(&item.id)),
        });
        transition(
            phase,
            match outcome {
                RunOutcome::Paused { .. } => Phase::Paused,
                RunOutcome::Completed { .. } => Phase::Completed,
            },
        );

        let report = RunReport {
            outcome,
            start_index,
            end_index,
            attempted: tally.attempted,
            succeeded: tally.succeeded,
            failed: tally.failed,
            skipped: tally.skipped,
            completed: progress.completed_count(),
            total: progress.total,
            test_mode: self.options.test_mode,
            persistence_failures: tally.persistence_failures,
        };
        self.sink.on_event(ProgressEvent::Finished {
            report: report.clone(),
        });

        Ok(report)
    }

    /// Loads (or resets) progress and records the current source size.
    ///
    /// The initial save doubles as a check that the store is writable.
    fn resume_state(&self, total: usize) -> Result<ProgressState, RunError> {
        let mut progress = if self.options.force_restart {
            info!("Forced restart, discarding previous progress");
            self.store.reset()?;
            ProgressState::default()
        } else {
            let mut loaded = self.store.load()?;
            loaded.normalize();
            loaded
        };

        if progress.total != 0 && progress.total != total {
            warn!(
                "Source changed since last run ({} items before, {} now); \
                 index-based resume may skip or repeat items",
                progress.total, total
            );
        }
        progress.total = total;
        self.store.save(&progress)?;

        Ok(progress)
    }

    /// Records an item as completed when its artifact is already on disk.
    fn adopt_existing(
        &self,
        item: &WorkItem,
        index: usize,
        progress: &mut ProgressState,
        tally: &mut Tally,
    ) -> bool {
        if !self.options.skip_existing {
            return false;
        }

        let naming = self.generator.output_naming(self.options.variant);
        let existing = naming.first_candidate(&self.options.output_dir, &sanitize_name(&item.id));
        if !existing.exists() {
            return false;
        }

        debug!("Artifact for {} already exists at {}", item.id, existing.display());
        progress.mark_completed(&item.id);
        progress.mark_attempted(index);
        self.persist(progress, tally);
        self.sink.on_event(ProgressEvent::Skipped {
            id: item.id.clone(),
            index,
            reason: format!("artifact exists at {}", existing.display()),
        });
        tally.skipped += 1;
        true
    }

    /// Generates one item and records the result, whatever it is.
    fn attempt(
        &self,
        item: &WorkItem,
        index: usize,
        end_index: usize,
        items: &[WorkItem],
        progress: &mut ProgressState,
        tally: &mut Tally,
    ) {
        let base_name = sanitize_name(&item.id);
        let naming = self.generator.output_naming(self.options.variant);
        let destination = naming.destination(&self.options.output_dir, &base_name);
        let request = ArtifactRequest::from_item(
            item,
            &self.options.params,
            self.options.variant,
            &self.options.output_dir,
            &base_name,
            destination,
        );

        debug!(
            generator = self.generator.name(),
            "Processing item {}/{}: {}",
            index + 1,
            end_index,
            item.id
        );
        self.sink.on_event(ProgressEvent::Started {
            id: item.id.clone(),
            index,
            end_index,
            prompt: request.prompt.clone(),
        });
        tally.attempted += 1;

        match self.generator.generate(&request) {
            Ok(artifact) => {
                progress.mark_completed(&item.id);
                progress.mark_attempted(index);
                self.persist(progress, tally);
                tally.succeeded += 1;

                let (done, of) = self.percentage_basis(items, end_index, progress);
                info!(
                    "Generated {} at {}",
                    item.id,
                    artifact.location.output.display()
                );
                self.sink.on_event(ProgressEvent::Completed {
                    id: item.id.clone(),
                    index,
                    artifact,
                    done,
                    of,
                });
            }
            Err(e) => {
                warn!("Error generating artifact for {}: {e}", item.id);
                progress.mark_attempted(index);
                self.persist(progress, tally);
                tally.failed += 1;
                self.sink.on_event(ProgressEvent::Failed {
                    id: item.id.clone(),
                    index,
                    error: e.to_string(),
                });
            }
        }
    }

    /// Saves progress; failures degrade to in-memory tracking and the next
    /// item boundary tries again.
    fn persist(&self, progress: &ProgressState, tally: &mut Tally) {
        match self.store.save(progress) {
            Ok(()) => {
                if tally.degraded {
                    info!("Progress persistence recovered");
                    tally.degraded = false;
                }
            }
            Err(e) => {
                warn!("Failed to save progress, continuing in memory: {e}");
                tally.persistence_failures += 1;
                tally.degraded = true;
                self.sink.on_event(ProgressEvent::PersistenceDegraded {
                    error: e.to_string(),
                });
            }
        }
    }

    /// Numerator and denominator for the running percentage. Test mode
    /// reports against the capped subset instead of the whole source.
    fn percentage_basis(
        &self,
        items: &[WorkItem],
        end_index: usize,
        progress: &ProgressState,
    ) -> (usize, usize) {
        if self.options.test_mode {
            let subset = &items[..end_index];
            let done = subset
                .iter()
                .filter(|item| progress.is_completed(&item.id))
                .count();
            (done, end_index)
        } else {
            (progress.completed_count(), progress.total)
        }
    }
}

fn transition(phase: &mut Phase, next: Phase) {
    debug!("Batch runner {phase} -> {next}");
    *phase = next;
}
