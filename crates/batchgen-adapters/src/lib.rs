//! Batchgen Adapters - External adapters for batchgen.
//!
//! This crate provides adapters for:
//! - Work sources (JS catalog, JSON catalog, image folder)
//! - The JSON progress file
//! - Generation backends and artifact location resolution

pub mod generation;
pub mod progress_file;
pub mod source;

pub use generation::{
    BackendOutput, GeminiBackend, GeminiConfig, GenerationBackend, GenerationClient,
    Hunyuan3dBackend, Hunyuan3dConfig, LocationResolver, Payload,
};
pub use progress_file::JsonProgressStore;
pub use source::{open_source, ImageFolderSource, JsCatalogSource, JsonCatalogSource};
