//! Backend selection shared by `run` and `generate`.

use std::time::Duration;

use anyhow::{Context, Result};
use batchgen_adapters::{
    GeminiBackend, GenerationBackend, GenerationClient, Hunyuan3dBackend, LocationResolver,
};
use batchgen_core::{GenerationParams, Variant};
use clap::{Args, ValueEnum};
use tracing::{debug, warn};

use crate::config::AppConfig;

/// Hardcoded backend defaults.
mod defaults {
    pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
}

/// Generation service to call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Gemini image generation (PNG icons)
    #[default]
    Gemini,
    /// Hunyuan3D Gradio server (GLB meshes)
    Hunyuan3d,
}

/// Backend arguments.
#[derive(Args, Clone, Default)]
pub struct GeneratorArgs {
    /// Generation backend
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Request the textured variant (Hunyuan3D only)
    #[arg(long)]
    pub textured: bool,
}

impl GeneratorArgs {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        if self.backend.is_none() {
            self.backend = config
                .generator
                .backend
                .as_deref()
                .and_then(|name| Backend::from_str(name, true).ok());
        }
        if !self.textured {
            self.textured = config.generator.textured.unwrap_or(false);
        }
        self
    }

    /// Get backend with fallback to Gemini.
    pub fn backend(&self) -> Backend {
        self.backend.unwrap_or_default()
    }

    pub const fn variant(&self) -> Variant {
        if self.textured {
            Variant::Enriched
        } else {
            Variant::Baseline
        }
    }
}

/// Builds the generation client for the selected backend.
pub fn build_generator(args: &GeneratorArgs, config: &AppConfig) -> Result<GenerationClient> {
    let backend: Box<dyn GenerationBackend> = match args.backend() {
        Backend::Gemini => {
            if args.textured {
                warn!("Gemini has no textured variant; --textured is ignored");
            }
            Box::new(GeminiBackend::new(gemini_config(config)).context("Failed to set up Gemini")?)
        }
        Backend::Hunyuan3d => Box::new(
            Hunyuan3dBackend::new(&hunyuan_config(config))
                .context("Failed to set up Hunyuan3D")?,
        ),
    };
    debug!("Using {} backend", backend.name());

    let extra_roots = config.hunyuan3d.cache_roots.clone().unwrap_or_default();
    Ok(GenerationClient::new(
        backend,
        LocationResolver::with_local_cache(extra_roots),
    ))
}

/// Sampling parameters from config, falling back to the service defaults.
pub fn generation_params(config: &AppConfig) -> GenerationParams {
    let h = &config.hunyuan3d;
    let d = GenerationParams::default();
    GenerationParams {
        steps: h.steps.unwrap_or(d.steps),
        guidance_scale: h.guidance_scale.unwrap_or(d.guidance_scale),
        seed: h.seed.unwrap_or(d.seed),
        octree_resolution: h.octree_resolution.unwrap_or(d.octree_resolution),
        remove_background: h.remove_background.unwrap_or(d.remove_background),
        num_chunks: h.num_chunks.unwrap_or(d.num_chunks),
        randomize_seed: h.randomize_seed.unwrap_or(d.randomize_seed),
    }
}

fn gemini_config(config: &AppConfig) -> batchgen_adapters::GeminiConfig {
    let d = batchgen_adapters::GeminiConfig::default();
    let key_env = config
        .gemini
        .api_key_env
        .as_deref()
        .unwrap_or(defaults::API_KEY_ENV);
    let api_key = std::env::var(key_env).ok();
    if api_key.is_none() {
        warn!("{key_env} is not set; Gemini requests will be unauthenticated");
    }

    batchgen_adapters::GeminiConfig {
        endpoint: config.gemini.endpoint.clone().unwrap_or(d.endpoint),
        model: config.gemini.model.clone().unwrap_or(d.model),
        api_key,
        timeout: config
            .gemini
            .timeout_secs
            .map_or(d.timeout, Duration::from_secs),
    }
}

fn hunyuan_config(config: &AppConfig) -> batchgen_adapters::Hunyuan3dConfig {
    let d = batchgen_adapters::Hunyuan3dConfig::default();
    batchgen_adapters::Hunyuan3dConfig {
        server_url: config.hunyuan3d.server_url.clone().unwrap_or(d.server_url),
        timeout: config
            .hunyuan3d
            .timeout_secs
            .map_or(d.timeout, Duration::from_secs),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_config() {
        let config: AppConfig = toml::from_str("[generator]\nbackend = \"hunyuan3d\"\ntextured = true\n").unwrap();
        let args = GeneratorArgs::default().with_config(&config);
        assert_eq!(args.backend(), Backend::Hunyuan3d);
        assert_eq!(args.variant(), Variant::Enriched);
    }

    #[test]
    fn test_cli_backend_wins() {
        let config: AppConfig = toml::from_str("[generator]\nbackend = \"hunyuan3d\"\n").unwrap();
        let args = GeneratorArgs {
            backend: Some(Backend::Gemini),
            textured: false,
        }
        .with_config(&config);
        assert_eq!(args.backend(), Backend::Gemini);
        assert_eq!(args.variant(), Variant::Baseline);
    }

    #[test]
    fn test_generation_params_layering() {
        let config: AppConfig = toml::from_str("[hunyuan3d]\nsteps = 30\nseed = 9\n").unwrap();
        let params = generation_params(&config);
        assert_eq!(params.steps, 30);
        assert_eq!(params.seed, 9);
        assert_eq!(params.octree_resolution, 256);
        assert!(params.remove_background);
    }

    #[test]
    fn test_hunyuan_config_defaults() {
        let config = hunyuan_config(&AppConfig::default());
        assert_eq!(config.server_url, "http://127.0.0.1:42003/");
    }
}
