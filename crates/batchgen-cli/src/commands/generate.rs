//! Generate command - one artifact from a prompt or image.
//!
//! Uses the same generation client as a batch run, without progress
//! tracking.

use std::path::PathBuf;

use anyhow::{Context, Result};
use batchgen_core::{
    sanitize_name, ArtifactGenerator, ArtifactRequest, ImageInput, ItemSpec, MultiView, WorkItem,
};
use clap::Args;
use tracing::info;

use super::backend::{self, GeneratorArgs};
use super::run::defaults;
use crate::config::AppConfig;

/// Arguments for the generate command
#[derive(Args)]
pub struct GenerateArgs {
    /// Prompt text, used verbatim
    #[arg(long, required_unless_present = "image", conflicts_with = "image")]
    pub prompt: Option<String>,

    /// Input image
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Front view image
    #[arg(long, value_name = "FILE", requires = "image")]
    pub front: Option<PathBuf>,

    /// Back view image
    #[arg(long, value_name = "FILE", requires = "image")]
    pub back: Option<PathBuf>,

    /// Left view image
    #[arg(long, value_name = "FILE", requires = "image")]
    pub left: Option<PathBuf>,

    /// Right view image
    #[arg(long, value_name = "FILE", requires = "image")]
    pub right: Option<PathBuf>,

    /// Output name (defaults to the image stem or the prompt)
    #[arg(long)]
    pub name: Option<String>,

    /// Directory the artifact is written to
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

impl GenerateArgs {
    /// Builds the single work item described by the arguments.
    fn work_item(&self) -> Result<WorkItem> {
        let spec = match (&self.prompt, &self.image) {
            (_, Some(image)) => ItemSpec::Image(ImageInput {
                image: image.clone(),
                views: MultiView {
                    front: self.front.clone(),
                    back: self.back.clone(),
                    left: self.left.clone(),
                    right: self.right.clone(),
                },
            }),
            (Some(text), None) => ItemSpec::Caption { text: text.clone() },
            (None, None) => anyhow::bail!("Either --prompt or --image is required"),
        };

        let id = match (&self.name, &self.image, &self.prompt) {
            (Some(name), _, _) => name.clone(),
            (None, Some(image), _) => image
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string()),
            (None, None, Some(prompt)) => prompt.chars().take(48).collect(),
            (None, None, None) => "artifact".to_string(),
        };

        Ok(WorkItem::new(id, spec))
    }
}

/// Run the generate command.
pub fn run(args: &GenerateArgs, config: &AppConfig) -> Result<()> {
    let item = args.work_item()?;
    let generator_args = args.generator.clone().with_config(config);
    let generator = backend::build_generator(&generator_args, config)?;

    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.paths.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from(defaults::OUTPUT_DIR));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let variant = generator_args.variant();
    let base_name = sanitize_name(&item.id);
    let destination = generator
        .output_naming(variant)
        .destination(&output_dir, &base_name);
    let request = ArtifactRequest::from_item(
        &item,
        &backend::generation_params(config),
        variant,
        &output_dir,
        &base_name,
        destination,
    );

    info!("Generating {} with {}", item.id, generator.name());
    let artifact = generator
        .generate(&request)
        .with_context(|| format!("Failed to generate {}", item.id))?;

    println!("{}", artifact.location.output.display());
    Ok(())
}
