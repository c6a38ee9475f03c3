//! Generation client and its service backends.
//!
//! A [`GenerationBackend`] talks to one remote service and reports where the
//! artifact ended up. [`GenerationClient`] wraps a backend, resolves reported
//! paths through the [`LocationResolver`] and copies or writes the artifact to
//! the request's destination.

mod gemini;
mod http;
mod hunyuan;
mod resolver;

use std::path::{Path, PathBuf};

use batchgen_core::{
    ArtifactGenerator, ArtifactLocation, ArtifactRequest, GeneratedArtifact, GenerationError,
    OutputNaming, Variant,
};
use tracing::{debug, info};

pub use gemini::{GeminiBackend, GeminiConfig};
pub use hunyuan::{Hunyuan3dBackend, Hunyuan3dConfig};
pub use resolver::LocationResolver;

/// What a backend hands back for a finished generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A path in the service's filesystem namespace.
    Reported(PathBuf),
    /// The artifact bytes, returned inline.
    Inline(Vec<u8>),
}

/// Backend result, tagged with the variant actually produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOutput {
    pub kind: Variant,
    pub payload: Payload,
}

/// One remote generation service.
pub trait GenerationBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Output layout of artifacts produced for `variant`.
    fn output_naming(&self, variant: Variant) -> OutputNaming;

    /// Submits one request and waits for the result.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Connection`] when the service is
    /// unreachable and [`GenerationError::Generation`] when it answers without
    /// a usable result.
    fn submit(&self, request: &ArtifactRequest) -> Result<BackendOutput, GenerationError>;
}

/// [`ArtifactGenerator`] over a remote backend.
pub struct GenerationClient {
    backend: Box<dyn GenerationBackend>,
    resolver: LocationResolver,
}

impl GenerationClient {
    #[must_use]
    pub fn new(backend: Box<dyn GenerationBackend>, resolver: LocationResolver) -> Self {
        Self { backend, resolver }
    }

    fn place(
        &self,
        payload: Payload,
        destination: &Path,
    ) -> Result<ArtifactLocation, GenerationError> {
        prepare_parent(destination)?;

        match payload {
            Payload::Reported(reported) => {
                let source = self.resolver.resolve(&reported)?;
                std::fs::copy(&source, destination).map_err(|e| {
                    GenerationError::Generation(format!(
                        "Failed to copy {} to {}: {e}",
                        source.display(),
                        destination.display()
                    ))
                })?;
                Ok(ArtifactLocation {
                    source,
                    output: destination.to_path_buf(),
                })
            }
            Payload::Inline(bytes) => {
                std::fs::write(destination, &bytes).map_err(|e| {
                    GenerationError::Generation(format!(
                        "Failed to write {}: {e}",
                        destination.display()
                    ))
                })?;
                Ok(ArtifactLocation {
                    source: destination.to_path_buf(),
                    output: destination.to_path_buf(),
                })
            }
        }
    }
}

impl ArtifactGenerator for GenerationClient {
    fn name(&self) -> &'static str {
        self.backend.name()
    }

    fn output_naming(&self, variant: Variant) -> OutputNaming {
        self.backend.output_naming(variant)
    }

    fn generate(&self, request: &ArtifactRequest) -> Result<GeneratedArtifact, GenerationError> {
        debug!(
            "Submitting {} to {} ({:?})",
            request.item_id,
            self.backend.name(),
            request.variant
        );
        let output = self.backend.submit(request)?;
        let location = self.place(output.payload, &request.destination)?;
        info!("Saved {}", location.output.display());

        Ok(GeneratedArtifact {
            kind: output.kind,
            location,
        })
    }
}

fn prepare_parent(destination: &Path) -> Result<(), GenerationError> {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| {
                GenerationError::Generation(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            }),
        _ => Ok(()),
    }
}
