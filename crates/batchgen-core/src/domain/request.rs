//! Per-attempt request and result types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ImageInput, ItemSpec, WorkItem};
use crate::naming::unique_path;
use crate::prompt::icon_prompt;

/// Which result shape to ask the generator for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Plain result (untextured mesh, single image).
    #[default]
    Baseline,
    /// Enriched result (textured mesh).
    Enriched,
}

/// Sampling parameters passed through to the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub steps: u32,
    pub guidance_scale: f32,
    pub seed: u64,
    pub octree_resolution: u32,
    pub remove_background: bool,
    pub num_chunks: u32,
    pub randomize_seed: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            steps: 5,
            guidance_scale: 5.0,
            seed: 1234,
            octree_resolution: 256,
            remove_background: true,
            num_chunks: 8000,
            randomize_seed: true,
        }
    }
}

/// How a generator lays out its artifacts under the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    /// File extension including the leading dot, e.g. `.png`.
    pub extension: String,
    /// When set, each item gets its own directory named after the item and
    /// the artifact is stored there under this stem.
    pub file_stem: Option<String>,
}

impl OutputNaming {
    /// Flat layout: `{dir}/{name}{ext}`.
    #[must_use]
    pub fn flat(extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
            file_stem: None,
        }
    }

    /// Per-item layout: `{dir}/{name}/{stem}{ext}`.
    #[must_use]
    pub fn per_item(stem: &str, extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
            file_stem: Some(stem.to_string()),
        }
    }

    /// The path an item maps to before any collision suffixing.
    #[must_use]
    pub fn first_candidate(&self, output_dir: &Path, base_name: &str) -> PathBuf {
        match &self.file_stem {
            Some(stem) => output_dir
                .join(base_name)
                .join(format!("{stem}{}", self.extension)),
            None => output_dir.join(format!("{base_name}{}", self.extension)),
        }
    }

    /// A destination that does not exist yet.
    #[must_use]
    pub fn destination(&self, output_dir: &Path, base_name: &str) -> PathBuf {
        match &self.file_stem {
            Some(stem) => unique_path(&output_dir.join(base_name), stem, &self.extension),
            None => unique_path(output_dir, base_name, &self.extension),
        }
    }
}

/// Everything the generation client needs for one attempt.
///
/// Built fresh for every attempt and discarded afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactRequest {
    /// Id of the originating work item.
    pub item_id: String,
    /// Prompt text, if the item is text-driven.
    pub prompt: Option<String>,
    /// Image input, if the item is image-driven.
    pub image: Option<ImageInput>,
    /// Sampling parameters.
    pub params: GenerationParams,
    /// Requested result shape.
    pub variant: Variant,
    /// Root output directory.
    pub output_dir: PathBuf,
    /// Filesystem-safe base name derived from the item id.
    pub base_name: String,
    /// Collision-free path the artifact is written to.
    pub destination: PathBuf,
}

impl ArtifactRequest {
    /// Materializes a work item into a request.
    #[must_use]
    pub fn from_item(
        item: &WorkItem,
        params: &GenerationParams,
        variant: Variant,
        output_dir: &Path,
        base_name: &str,
        destination: PathBuf,
    ) -> Self {
        let (prompt, image) = match &item.spec {
            ItemSpec::Catalog(entry) => (Some(icon_prompt(entry)), None),
            ItemSpec::Caption { text } => (Some(text.clone()), None),
            ItemSpec::Image(input) => (None, Some(input.clone())),
        };

        Self {
            item_id: item.id.clone(),
            prompt,
            image,
            params: params.clone(),
            variant,
            output_dir: output_dir.to_path_buf(),
            base_name: base_name.to_string(),
            destination,
        }
    }
}

/// Where a produced artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactLocation {
    /// Readable path the service produced (after fallback resolution).
    pub source: PathBuf,
    /// Path the artifact was copied or written to.
    pub output: PathBuf,
}

/// Tagged result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub kind: Variant,
    pub location: ArtifactLocation,
}
