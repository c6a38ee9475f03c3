//! Configuration file support for batchgen.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/batchgen/config.toml` (lowest priority)
//! - Project-local: `.batchgen.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Batch runner settings.
    pub run: RunConfig,
    /// Source, output and progress locations.
    pub paths: PathsConfig,
    /// Backend selection.
    pub generator: GeneratorConfig,
    /// Gemini image API settings.
    pub gemini: GeminiConfig,
    /// Hunyuan3D server and sampling settings.
    pub hunyuan3d: Hunyuan3dConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// Batch runner configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Attempted items per invocation.
    pub batch_size: Option<usize>,
    /// Seconds between requests.
    pub delay: Option<f64>,
    /// Items processed in test mode.
    pub test_mode_cap: Option<usize>,
    /// Resume strategy: "index" or "identity".
    pub resume: Option<String>,
    /// Treat items whose artifact already exists as completed.
    pub skip_existing: Option<bool>,
}

/// Filesystem locations.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub source: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub progress_file: Option<PathBuf>,
}

/// Backend selection.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Backend name: "gemini" or "hunyuan3d".
    pub backend: Option<String>,
    /// Request the textured (enriched) variant.
    pub textured: Option<bool>,
}

/// Gemini image API configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Hunyuan3D configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Hunyuan3dConfig {
    pub server_url: Option<String>,
    pub steps: Option<u32>,
    pub guidance_scale: Option<f32>,
    pub seed: Option<u64>,
    pub octree_resolution: Option<u32>,
    pub remove_background: Option<bool>,
    pub num_chunks: Option<u32>,
    pub randomize_seed: Option<bool>,
    /// Extra roots searched for artifacts the server reports by path.
    pub cache_roots: Option<Vec<PathBuf>>,
    pub timeout_secs: Option<u64>,
}

/// Output configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/batchgen/config.toml`
    /// 2. Project-local: `.batchgen.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as
    /// warnings and dropped.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load XDG config (lowest priority)
        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        // Load project-local config (higher priority, merged)
        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Drops out-of-range values, reporting every one of them.
    fn validate(&mut self) -> Result<(), String> {
        let mut problems = Vec::new();

        if let Some(n) = self.run.batch_size.filter(|n| *n == 0) {
            problems.push(format!("run.batch_size must be at least 1, got {n}"));
            self.run.batch_size = None;
        }
        if let Some(d) = self
            .run
            .delay
            .filter(|d| Duration::try_from_secs_f64(*d).is_err())
        {
            problems.push(format!(
                "run.delay must be a non-negative number of seconds, got {d}"
            ));
            self.run.delay = None;
        }
        if let Some(n) = self.run.test_mode_cap.filter(|n| *n == 0) {
            problems.push(format!("run.test_mode_cap must be at least 1, got {n}"));
            self.run.test_mode_cap = None;
        }
        if let Some(r) = self
            .run
            .resume
            .take_if(|r| !matches!(r.as_str(), "index" | "identity"))
        {
            problems.push(format!("run.resume must be 'index' or 'identity', got '{r}'"));
        }
        if let Some(b) = self
            .generator
            .backend
            .take_if(|b| !matches!(b.as_str(), "gemini" | "hunyuan3d"))
        {
            problems.push(format!(
                "generator.backend must be 'gemini' or 'hunyuan3d', got '{b}'"
            ));
        }
        if let Some(n) = self.hunyuan3d.steps.filter(|n| *n == 0) {
            problems.push(format!("hunyuan3d.steps must be at least 1, got {n}"));
            self.hunyuan3d.steps = None;
        }
        if let Some(g) = self.hunyuan3d.guidance_scale.filter(|g| !g.is_finite() || *g <= 0.0) {
            problems.push(format!("hunyuan3d.guidance_scale must be positive, got {g}"));
            self.hunyuan3d.guidance_scale = None;
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // Run
        self.run.batch_size = other.run.batch_size.or(self.run.batch_size);
        self.run.delay = other.run.delay.or(self.run.delay);
        self.run.test_mode_cap = other.run.test_mode_cap.or(self.run.test_mode_cap);
        self.run.resume = other.run.resume.or_else(|| self.run.resume.take());
        self.run.skip_existing = other.run.skip_existing.or(self.run.skip_existing);

        // Paths
        self.paths.source = other.paths.source.or_else(|| self.paths.source.take());
        self.paths.output_dir = other
            .paths
            .output_dir
            .or_else(|| self.paths.output_dir.take());
        self.paths.progress_file = other
            .paths
            .progress_file
            .or_else(|| self.paths.progress_file.take());

        // Generator
        self.generator.backend = other
            .generator
            .backend
            .or_else(|| self.generator.backend.take());
        self.generator.textured = other.generator.textured.or(self.generator.textured);

        // Gemini
        self.gemini.endpoint = other
            .gemini
            .endpoint
            .or_else(|| self.gemini.endpoint.take());
        self.gemini.model = other.gemini.model.or_else(|| self.gemini.model.take());
        self.gemini.api_key_env = other
            .gemini
            .api_key_env
            .or_else(|| self.gemini.api_key_env.take());
        self.gemini.timeout_secs = other.gemini.timeout_secs.or(self.gemini.timeout_secs);

        // Hunyuan3D
        let h = other.hunyuan3d;
        self.hunyuan3d.server_url = h.server_url.or_else(|| self.hunyuan3d.server_url.take());
        self.hunyuan3d.steps = h.steps.or(self.hunyuan3d.steps);
        self.hunyuan3d.guidance_scale = h.guidance_scale.or(self.hunyuan3d.guidance_scale);
        self.hunyuan3d.seed = h.seed.or(self.hunyuan3d.seed);
        self.hunyuan3d.octree_resolution =
            h.octree_resolution.or(self.hunyuan3d.octree_resolution);
        self.hunyuan3d.remove_background =
            h.remove_background.or(self.hunyuan3d.remove_background);
        self.hunyuan3d.num_chunks = h.num_chunks.or(self.hunyuan3d.num_chunks);
        self.hunyuan3d.randomize_seed = h.randomize_seed.or(self.hunyuan3d.randomize_seed);
        self.hunyuan3d.cache_roots = h
            .cache_roots
            .or_else(|| self.hunyuan3d.cache_roots.take());
        self.hunyuan3d.timeout_secs = h.timeout_secs.or(self.hunyuan3d.timeout_secs);

        // Output
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("batchgen").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.batchgen.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".batchgen.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.run.batch_size.is_none());
        assert!(config.paths.source.is_none());
        assert!(config.hunyuan3d.cache_roots.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: AppConfig = toml::from_str("").expect("parse empty config");
        assert!(config.generator.backend.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[run]
batch_size = 5
delay = 0.5
test_mode_cap = 2
resume = "identity"
skip_existing = true

[paths]
source = "catalog/randomitems.js"
output_dir = "icons"
progress_file = "state/progress.json"

[generator]
backend = "hunyuan3d"
textured = true

[gemini]
model = "gemini-2.0-flash-exp-image-generation"
api_key_env = "MY_KEY"

[hunyuan3d]
server_url = "http://10.0.0.5:42003/"
steps = 30
guidance_scale = 7.5
seed = 42
octree_resolution = 384
remove_background = false
num_chunks = 200000
randomize_seed = false
cache_roots = ["/srv/pinokio/cache/GRADIO_TEMP_DIR"]
timeout_secs = 900

[output]
progress = true
"#;
        let config: AppConfig = toml::from_str(toml).expect("parse full config");
        assert_eq!(config.run.batch_size, Some(5));
        assert_eq!(config.run.delay, Some(0.5));
        assert_eq!(config.run.resume.as_deref(), Some("identity"));
        assert_eq!(
            config.paths.progress_file,
            Some(PathBuf::from("state/progress.json"))
        );
        assert_eq!(config.generator.backend.as_deref(), Some("hunyuan3d"));
        assert_eq!(config.gemini.api_key_env.as_deref(), Some("MY_KEY"));
        assert_eq!(config.hunyuan3d.guidance_scale, Some(7.5));
        assert_eq!(
            config.hunyuan3d.cache_roots,
            Some(vec![PathBuf::from("/srv/pinokio/cache/GRADIO_TEMP_DIR")])
        );
        assert_eq!(config.output.progress, Some(true));
    }

    // === Merge Tests ===

    #[test]
    fn test_merge_configs() {
        let mut base: AppConfig = toml::from_str(
            r#"
[run]
batch_size = 10
delay = 2.0

[generator]
backend = "gemini"
"#,
        )
        .unwrap();
        let project: AppConfig = toml::from_str(
            r#"
[run]
batch_size = 3

[generator]
backend = "hunyuan3d"
"#,
        )
        .unwrap();

        base.merge(project);
        assert_eq!(base.run.batch_size, Some(3));
        assert_eq!(base.run.delay, Some(2.0));
        assert_eq!(base.generator.backend.as_deref(), Some("hunyuan3d"));
    }

    #[test]
    fn test_merge_preserves_base_when_override_is_none() {
        let mut base: AppConfig = toml::from_str(
            r#"
[paths]
output_dir = "icons"

[hunyuan3d]
cache_roots = ["/a"]
seed = 7
"#,
        )
        .unwrap();

        base.merge(AppConfig::default());
        assert_eq!(base.paths.output_dir, Some(PathBuf::from("icons")));
        assert_eq!(base.hunyuan3d.cache_roots, Some(vec![PathBuf::from("/a")]));
        assert_eq!(base.hunyuan3d.seed, Some(7));
    }

    #[test]
    fn test_merge_empty_base_accepts_override() {
        let mut base = AppConfig::default();
        let other: AppConfig = toml::from_str(
            r#"
[gemini]
endpoint = "http://localhost:8080"
timeout_secs = 30

[output]
progress = false
"#,
        )
        .unwrap();

        base.merge(other);
        assert_eq!(base.gemini.endpoint.as_deref(), Some("http://localhost:8080"));
        assert_eq!(base.gemini.timeout_secs, Some(30));
        assert_eq!(base.output.progress, Some(false));
    }

    // === Invalid TOML Graceful Fallback ===

    #[test]
    fn test_invalid_toml_syntax_handled() {
        let result: Result<AppConfig, _> = toml::from_str("[run\nbatch_size = 5\n");
        assert!(result.is_err(), "invalid TOML should return error");
    }

    #[test]
    fn test_invalid_field_type_handled() {
        let result: Result<AppConfig, _> = toml::from_str("[run]\nbatch_size = \"ten\"\n");
        assert!(result.is_err(), "type mismatch should return error");
    }

    #[test]
    fn test_unknown_field_in_known_section() {
        let config: AppConfig =
            toml::from_str("[run]\nbatch_size = 4\nunknown_field = 1\n").expect("parse");
        assert_eq!(config.run.batch_size, Some(4));
    }

    #[test]
    fn test_load_file_missing_returns_none() {
        assert!(load_file(Path::new("/nonexistent/.batchgen.toml")).is_none());
    }

    #[test]
    fn test_find_config_in_parents() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("a/.batchgen.toml"), "").unwrap();

        let found = find_config_in_parents(&nested).unwrap();
        assert_eq!(found, root.path().join("a/.batchgen.toml"));
    }

    // === Validation Tests ===

    #[test]
    fn test_validate_drops_zero_batch_size() {
        let mut config = AppConfig::default();
        config.run.batch_size = Some(0);
        config.run.delay = Some(1.0);

        let result = config.validate();
        assert!(result.unwrap_err().contains("run.batch_size"));
        assert!(config.run.batch_size.is_none());
        assert_eq!(config.run.delay, Some(1.0));
    }

    #[test]
    fn test_validate_negative_delay() {
        let mut config = AppConfig::default();
        config.run.delay = Some(-1.0);
        assert!(config.validate().unwrap_err().contains("run.delay"));
        assert!(config.run.delay.is_none());
    }

    #[test]
    fn test_validate_oversized_delay() {
        let mut config = AppConfig::default();
        config.run.delay = Some(1e300);
        assert!(config.validate().unwrap_err().contains("run.delay"));
        assert!(config.run.delay.is_none());
    }

    #[test]
    fn test_validate_unknown_names() {
        let mut config = AppConfig::default();
        config.run.resume = Some("newest".to_string());
        config.generator.backend = Some("dalle".to_string());

        let err = config.validate().unwrap_err();
        assert!(err.contains("run.resume"));
        assert!(err.contains("generator.backend"));
        assert!(config.run.resume.is_none());
        assert!(config.generator.backend.is_none());
    }

    #[test]
    fn test_validate_hunyuan_ranges() {
        let mut config = AppConfig::default();
        config.hunyuan3d.steps = Some(0);
        config.hunyuan3d.guidance_scale = Some(0.0);

        let err = config.validate().unwrap_err();
        assert!(err.contains("hunyuan3d.steps"));
        assert!(err.contains("hunyuan3d.guidance_scale"));
    }

    #[test]
    fn test_validate_all_valid_passes() {
        let mut config: AppConfig = toml::from_str(
            r#"
[run]
batch_size = 1
delay = 0.0
resume = "index"

[generator]
backend = "gemini"
"#,
        )
        .expect("parse valid config");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_config_passes() {
        assert!(AppConfig::default().validate().is_ok());
    }
}
