//! Progress reporting adapter using indicatif.

use batchgen_core::{ProgressEvent, ProgressSink};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter for CLI output.
///
/// Draws a bar when `show_bar` is set and prints one line per item
/// otherwise. Failures are always printed unless quiet.
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl ProgressReporter {
    /// Creates a new reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, show progress bar; otherwise show per-item status
    #[must_use]
    pub fn new(quiet: bool, show_bar: bool) -> Self {
        if quiet {
            return Self {
                bar: None,
                quiet: true,
            };
        }

        let bar = show_bar.then(|| {
            let bar = ProgressBar::new(0);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        });

        Self { bar, quiet }
    }

    /// Prints a line without tearing the bar.
    fn line(&self, text: &str) {
        match &self.bar {
            Some(bar) => bar.suspend(|| eprintln!("{text}")),
            None => eprintln!("{text}"),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(done: usize, of: usize) -> f64 {
    if of == 0 {
        0.0
    } else {
        done as f64 / of as f64 * 100.0
    }
}

fn progress_message(done: usize, of: usize) -> String {
    format!("progress: {:.1}% ({done}/{of})", percent(done, of))
}

impl ProgressSink for ProgressReporter {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        match event {
            ProgressEvent::Resumed {
                start_index,
                end_index,
                total,
                completed,
            } => {
                if let Some(bar) = &self.bar {
                    bar.set_length(end_index.saturating_sub(start_index) as u64);
                } else {
                    eprintln!(
                        "Found {total} items ({completed} already completed); processing {}..{end_index}",
                        start_index + 1
                    );
                }
            }
            ProgressEvent::Started {
                id,
                index,
                end_index,
                prompt,
            } => {
                if let Some(bar) = &self.bar {
                    bar.set_message(id);
                } else {
                    eprintln!("Processing item {}/{end_index}: {id}", index + 1);
                    if let Some(prompt) = prompt {
                        tracing::debug!("Prompt: {prompt}");
                    }
                }
            }
            ProgressEvent::Skipped { id, reason, .. } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                } else {
                    eprintln!("Skipping {id}: {reason}");
                }
            }
            ProgressEvent::Completed {
                artifact, done, of, ..
            } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                    bar.set_message(progress_message(done, of));
                } else {
                    eprintln!(
                        "Saved {} - {}",
                        artifact.location.output.display(),
                        progress_message(done, of)
                    );
                }
            }
            ProgressEvent::Failed { id, error, .. } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
                self.line(&format!("Error generating {id}: {error}"));
            }
            ProgressEvent::PersistenceDegraded { error } => {
                self.line(&format!("warning: progress not saved: {error}"));
            }
            ProgressEvent::Waiting { delay } => {
                if self.bar.is_none() {
                    eprintln!("Waiting {:.1} seconds before next request...", delay.as_secs_f64());
                }
            }
            ProgressEvent::Finished { report } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(format!(
                        "Done: {} succeeded, {} failed",
                        report.succeeded, report.failed
                    ));
                }
            }
        }
    }
}
