//! Artifact generation port.

use crate::domain::{ArtifactRequest, GeneratedArtifact, OutputNaming, Variant};
use crate::error::GenerationError;

/// Port for producing one artifact per request.
///
/// Implementations submit the request to a generation service, resolve the
/// produced file and place it at `request.destination`.
pub trait ArtifactGenerator: Send + Sync {
    /// Returns the name of this generator.
    fn name(&self) -> &'static str;

    /// Output layout used for the given variant.
    fn output_naming(&self, variant: Variant) -> OutputNaming;

    /// Generates the artifact for `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] describing why this single attempt failed.
    fn generate(&self, request: &ArtifactRequest) -> Result<GeneratedArtifact, GenerationError>;
}
