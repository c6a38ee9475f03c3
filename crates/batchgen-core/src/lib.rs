//! Batchgen Core - Domain logic for resumable batch artifact generation.
//!
//! This crate contains the work item and progress types, the error taxonomy,
//! the port traits adapters implement, artifact naming, prompt composition
//! and the batch runner that ties them together.

pub mod domain;
pub mod error;
pub mod naming;
pub mod ports;
pub mod prompt;
pub mod runner;

pub use domain::{
    ArtifactLocation, ArtifactRequest, CatalogEntry, GeneratedArtifact, GenerationParams,
    ImageInput, ItemSpec, MultiView, OutputNaming, ProgressState, Variant, WorkItem,
};
pub use error::{GenerationError, ParseError, PersistenceError, RunError};
pub use naming::{sanitize_name, unique_path};
pub use ports::{
    ArtifactGenerator, Pacer, ProgressEvent, ProgressSink, ProgressStore, ThreadPacer, WorkSource,
};
pub use runner::{BatchRunner, ResumeStrategy, RunOptions, RunOutcome, RunReport};
