//! Batch runner behaviour against mocked ports.
//!
//! Covers resume, batch capping, test mode, forced restart, failure
//! isolation and persistence degradation.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use batchgen_core::{
    BatchRunner, OutputNaming, ProgressState, ResumeStrategy, RunError, RunOptions, RunOutcome,
};
use batchgen_test_support::{
    ItemBuilder, MockGenerator, MockProgressSink, MockProgressStore, MockWorkSource,
    RecordingPacer,
};

const FIVE: &[&str] = &["A", "B", "C", "D", "E"];

fn options(dir: &tempfile::TempDir) -> RunOptions {
    RunOptions {
        batch_size: 10,
        delay: Duration::ZERO,
        output_dir: dir.path().join("out"),
        ..RunOptions::default()
    }
}

fn state(completed: &[&str], total: usize, last_index: i64) -> ProgressState {
    ProgressState {
        completed: completed.iter().map(ToString::to_string).collect(),
        total,
        last_index,
    }
}

// === Resume Across Invocations ===

#[test]
fn test_three_runs_with_batch_size_two() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    let store = MockProgressStore::new();
    let sink = MockProgressSink::new();
    let opts = RunOptions {
        batch_size: 2,
        ..options(&dir)
    };

    // Run 1
    let generator = MockGenerator::new();
    let report = BatchRunner::new(&source, &store, &generator, &sink, opts.clone())
        .run()
        .unwrap();
    assert_eq!(generator.requested_ids(), vec!["A", "B"]);
    assert_eq!(report.outcome, RunOutcome::Paused { next_index: 2 });
    assert_eq!(store.state().unwrap(), state(&["A", "B"], 5, 1));

    // Run 2
    let generator = MockGenerator::new();
    let report = BatchRunner::new(&source, &store, &generator, &sink, opts.clone())
        .run()
        .unwrap();
    assert_eq!(report.start_index, 2);
    assert_eq!(generator.requested_ids(), vec!["C", "D"]);
    assert_eq!(report.outcome, RunOutcome::Paused { next_index: 4 });
    assert_eq!(store.state().unwrap(), state(&["A", "B", "C", "D"], 5, 3));

    // Run 3
    let generator = MockGenerator::new();
    let report = BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();
    assert_eq!(generator.requested_ids(), vec!["E"]);
    assert_eq!(report.outcome, RunOutcome::Completed { all_done: true });
    assert_eq!(report.completed, 5);
    assert_eq!(report.total, 5);
}

#[test]
fn test_resume_never_reattempts_completed_ids() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    // A crash after C was attempted, but B had been completed out of order.
    let store = MockProgressStore::with_state(state(&["A", "B", "D"], 5, 2));
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();

    let report = BatchRunner::new(&source, &store, &generator, &sink, options(&dir))
        .run()
        .unwrap();

    assert_eq!(report.start_index, 3);
    assert_eq!(generator.requested_ids(), vec!["E"]);
    assert_eq!(report.skipped, 1);
    assert_eq!(sink.skipped_count(), 1);
}

#[test]
fn test_skip_first_ignores_persisted_last_index() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    let store = MockProgressStore::with_state(state(&["A"], 5, 0));
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();
    let opts = RunOptions {
        skip_first: Some(3),
        ..options(&dir)
    };

    let report = BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();

    assert_eq!(report.start_index, 3);
    assert_eq!(generator.requested_ids(), vec!["D", "E"]);
    // B and C were never processed.
    assert_eq!(report.outcome, RunOutcome::Completed { all_done: false });
}

#[test]
fn test_identity_resume_fills_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    let store = MockProgressStore::with_state(state(&["A", "C", "D", "E"], 5, 4));
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();
    let opts = RunOptions {
        resume: ResumeStrategy::Identity,
        ..options(&dir)
    };

    let report = BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();

    assert_eq!(generator.requested_ids(), vec!["B"]);
    assert!(report.all_done());
    // last_index never moves backwards.
    assert_eq!(store.state().unwrap().last_index, 4);
}

// === Forced Restart ===

#[test]
fn test_force_restart_discards_prior_state() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    let store = MockProgressStore::with_state(state(&["A", "B", "C"], 5, 2));
    let generator = MockGenerator::new().failing_on("A");
    let sink = MockProgressSink::new();
    let opts = RunOptions {
        force_restart: true,
        batch_size: 1,
        ..options(&dir)
    };

    BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();

    assert_eq!(store.reset_count(), 1);
    assert_eq!(generator.requested_ids(), vec!["A"]);
    let saved = store.state().unwrap();
    assert!(saved.completed.is_empty());
    assert_eq!(saved.last_index, 0);
}

#[test]
fn test_force_restart_initial_state_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    let store = MockProgressStore::with_state(state(&["A", "B"], 5, 1));
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();
    let opts = RunOptions {
        force_restart: true,
        test_mode: true,
        test_mode_cap: 0,
        ..options(&dir)
    };

    BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();

    assert_eq!(store.state().unwrap(), state(&[], 5, -1));
}

// === Test Mode ===

#[test]
fn test_test_mode_processes_capped_subset() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    let store = MockProgressStore::new();
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();
    let opts = RunOptions {
        test_mode: true,
        ..options(&dir)
    };

    let report = BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();

    assert_eq!(generator.requested_ids(), vec!["A", "B", "C"]);
    assert_eq!(sink.percentages(), vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(report.resume_hint(), Some(3));
    assert_eq!(report.outcome, RunOutcome::Completed { all_done: false });
}

#[test]
fn test_test_mode_cap_larger_than_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(&["A", "B"]));
    let store = MockProgressStore::new();
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();
    let opts = RunOptions {
        test_mode: true,
        ..options(&dir)
    };

    let report = BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();

    assert_eq!(generator.call_count(), 2);
    assert_eq!(sink.percentages(), vec![(1, 2), (2, 2)]);
    assert!(report.all_done());
}

#[test]
fn test_full_run_percentage_uses_total() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    let store = MockProgressStore::new();
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();
    let opts = RunOptions {
        batch_size: 2,
        ..options(&dir)
    };

    BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();

    assert_eq!(sink.percentages(), vec![(1, 5), (2, 5)]);
}

// === Failure Isolation ===

#[test]
fn test_failed_item_does_not_stop_batch() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    let store = MockProgressStore::new();
    let generator = MockGenerator::new().failing_on("B");
    let sink = MockProgressSink::new();

    let report = BatchRunner::new(&source, &store, &generator, &sink, options(&dir))
        .run()
        .unwrap();

    assert_eq!(generator.requested_ids(), vec!["A", "B", "C", "D", "E"]);
    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 4);
    assert_eq!(sink.failed_count(), 1);

    let saved = store.state().unwrap();
    assert!(!saved.is_completed("B"));
    assert_eq!(saved.last_index, 4);
    assert_eq!(report.outcome, RunOutcome::Completed { all_done: false });
}

#[test]
fn test_failure_still_advances_last_index() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    let store = MockProgressStore::new();
    let generator = MockGenerator::new().failing_on("A");
    let sink = MockProgressSink::new();
    let opts = RunOptions {
        batch_size: 1,
        ..options(&dir)
    };

    let report = BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Paused { next_index: 1 });
    assert_eq!(store.state().unwrap(), state(&[], 5, 0));
}

#[test]
fn test_failed_items_count_toward_batch_cap() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    let store = MockProgressStore::new();
    let generator = MockGenerator::new().unreachable();
    let sink = MockProgressSink::new();
    let opts = RunOptions {
        batch_size: 3,
        ..options(&dir)
    };

    let report = BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();

    assert_eq!(report.attempted, 3);
    assert_eq!(report.outcome, RunOutcome::Paused { next_index: 3 });
}

// === Duplicates ===

#[test]
fn test_duplicate_id_skipped_after_first_success() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(&["A", "B", "A"]));
    let store = MockProgressStore::new();
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();

    let report = BatchRunner::new(&source, &store, &generator, &sink, options(&dir))
        .run()
        .unwrap();

    assert_eq!(generator.requested_ids(), vec!["A", "B"]);
    assert_eq!(report.skipped, 1);
    assert!(report.all_done());
}

#[test]
fn test_duplicate_id_skipped_after_forced_restart() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(&["A", "B", "A"]));
    let store = MockProgressStore::with_state(state(&["A", "B"], 3, 2));
    let generator = MockGenerator::new().writing_files();
    let sink = MockProgressSink::new();
    let opts = RunOptions {
        force_restart: true,
        ..options(&dir)
    };

    let report = BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();

    assert_eq!(generator.requested_ids(), vec!["A", "B"]);
    assert_eq!(report.skipped, 1);
    assert!(dir.path().join("out/a.png").exists());
    assert!(!dir.path().join("out/a_1.png").exists());
}

// === Pacing ===

#[test]
fn test_pacing_skipped_after_last_item() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(&["A", "B", "C"]));
    let store = MockProgressStore::new();
    let generator = MockGenerator::new().failing_on("B");
    let sink = MockProgressSink::new();
    let pacer = RecordingPacer::new();
    let opts = RunOptions {
        delay: Duration::from_millis(1500),
        ..options(&dir)
    };

    BatchRunner::new(&source, &store, &generator, &sink, opts)
        .with_pacer(&pacer)
        .run()
        .unwrap();

    assert_eq!(pacer.pauses(), vec![Duration::from_millis(1500); 2]);
}

#[test]
fn test_no_pacing_for_skipped_items_or_before_pause() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    let store = MockProgressStore::with_state(state(&["A"], 5, -1));
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();
    let pacer = RecordingPacer::new();
    let opts = RunOptions {
        batch_size: 2,
        delay: Duration::from_secs(1),
        ..options(&dir)
    };

    BatchRunner::new(&source, &store, &generator, &sink, opts)
        .with_pacer(&pacer)
        .run()
        .unwrap();

    // A skipped, B paced, C hits the cap.
    assert_eq!(generator.requested_ids(), vec!["B", "C"]);
    assert_eq!(pacer.pauses().len(), 1);
}

// === Aborts And Persistence ===

#[test]
fn test_source_failure_aborts_before_generation() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::failing();
    let store = MockProgressStore::new();
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();

    let result = BatchRunner::new(&source, &store, &generator, &sink, options(&dir)).run();

    assert!(matches!(result, Err(RunError::Source(_))));
    assert_eq!(generator.call_count(), 0);
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_empty_source_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(vec![]);
    let store = MockProgressStore::new();
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();

    let result = BatchRunner::new(&source, &store, &generator, &sink, options(&dir)).run();
    assert!(matches!(result, Err(RunError::Source(_))));
}

#[test]
fn test_corrupt_progress_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    let store = MockProgressStore::new().failing_load();
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();

    let result = BatchRunner::new(&source, &store, &generator, &sink, options(&dir)).run();

    assert!(matches!(result, Err(RunError::Persistence(_))));
    assert_eq!(generator.call_count(), 0);
}

#[test]
fn test_unwritable_store_at_startup_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(FIVE));
    let store = MockProgressStore::new().failing_saves(1);
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();

    let result = BatchRunner::new(&source, &store, &generator, &sink, options(&dir)).run();
    assert!(matches!(result, Err(RunError::Persistence(_))));
}

#[test]
fn test_mid_run_save_failure_degrades_and_retries() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(&["A", "B", "C"]));
    // Save 1 is the startup save; save 2 follows A.
    let store = MockProgressStore::new().failing_save_calls(&[2]);
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();

    let report = BatchRunner::new(&source, &store, &generator, &sink, options(&dir))
        .run()
        .unwrap();

    assert_eq!(generator.requested_ids(), vec!["A", "B", "C"]);
    assert_eq!(report.persistence_failures, 1);
    assert_eq!(sink.degraded_count(), 1);
    // In-memory state carried A into the next successful save.
    assert_eq!(store.state().unwrap(), state(&["A", "B", "C"], 3, 2));
}

#[test]
fn test_output_directory_created() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(&["A"]));
    let store = MockProgressStore::new();
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();
    let opts = options(&dir);
    let out = opts.output_dir.clone();

    BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();

    assert!(out.is_dir());
}

// === Naming ===

#[test]
fn test_destinations_are_sanitized_and_unique() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("blazing_sword_.png"), b"old").unwrap();

    let source = MockWorkSource::new(ItemBuilder::catalog_items(&["Blazing Sword!"]));
    let store = MockProgressStore::new();
    let generator = MockGenerator::new().writing_files();
    let sink = MockProgressSink::new();

    BatchRunner::new(&source, &store, &generator, &sink, options(&dir))
        .run()
        .unwrap();

    let request = &generator.requests()[0];
    assert_eq!(request.base_name, "blazing_sword_");
    assert_eq!(request.destination, out.join("blazing_sword__1.png"));
    assert_eq!(std::fs::read(out.join("blazing_sword_.png")).unwrap(), b"old");
}

#[test]
fn test_per_item_layout_destination() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockWorkSource::new(ItemBuilder::catalog_items(&["Chair"]));
    let store = MockProgressStore::new();
    let generator =
        MockGenerator::new().with_naming(OutputNaming::per_item("white_mesh", ".glb"));
    let sink = MockProgressSink::new();
    let opts = options(&dir);
    let out = opts.output_dir.clone();

    BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();

    assert_eq!(
        generator.requests()[0].destination,
        out.join("chair").join("white_mesh.glb")
    );
}

#[test]
fn test_skip_existing_adopts_artifact_without_generation() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("b.png"), b"done").unwrap();

    let source = MockWorkSource::new(ItemBuilder::catalog_items(&["A", "B", "C"]));
    let store = MockProgressStore::new();
    let generator = MockGenerator::new();
    let sink = MockProgressSink::new();
    let opts = RunOptions {
        skip_existing: true,
        ..options(&dir)
    };

    let report = BatchRunner::new(&source, &store, &generator, &sink, opts)
        .run()
        .unwrap();

    assert_eq!(generator.requested_ids(), vec!["A", "C"]);
    assert!(store.state().unwrap().is_completed("B"));
    assert!(report.all_done());
}
