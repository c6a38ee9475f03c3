//! Core domain types for batch artifact generation.

mod item;
mod progress;
mod request;

pub use item::{CatalogEntry, ImageInput, ItemSpec, MultiView, WorkItem};
pub use progress::ProgressState;
pub use request::{
    ArtifactLocation, ArtifactRequest, GeneratedArtifact, GenerationParams, OutputNaming, Variant,
};
