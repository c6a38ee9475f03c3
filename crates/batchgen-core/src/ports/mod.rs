//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the batch engine and external adapters.

mod generator;
mod pacer;
mod progress;
mod progress_store;
mod work_source;

pub use generator::ArtifactGenerator;
pub use pacer::{Pacer, ThreadPacer};
pub use progress::{ProgressEvent, ProgressSink};
pub use progress_store::ProgressStore;
pub use work_source::WorkSource;
