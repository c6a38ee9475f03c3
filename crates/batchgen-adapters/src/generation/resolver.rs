//! Fallback resolution of paths reported by a generation service.
//!
//! A service running in another process (or container) reports artifact
//! paths in its own filesystem namespace. When such a path is not readable
//! here, the last two components (`{cache_id}/{file}`) are tried under each
//! known cache root in order.

use std::path::{Path, PathBuf};

use batchgen_core::GenerationError;
use tracing::debug;

/// Cache directory name under the working directory.
pub const LOCAL_CACHE_DIR: &str = "gradio_cache";

/// Ordered list of cache roots to search.
#[derive(Debug, Clone, Default)]
pub struct LocationResolver {
    roots: Vec<PathBuf>,
}

impl LocationResolver {
    /// Creates a resolver searching exactly `roots`.
    #[must_use]
    pub const fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Creates a resolver searching `./gradio_cache` first, then `extra`.
    #[must_use]
    pub fn with_local_cache(extra: Vec<PathBuf>) -> Self {
        let local = std::env::current_dir()
            .map(|cwd| cwd.join(LOCAL_CACHE_DIR))
            .unwrap_or_else(|_| PathBuf::from(LOCAL_CACHE_DIR));

        let mut roots = vec![local];
        roots.extend(extra);
        Self { roots }
    }

    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Returns a readable location for `reported`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::LocationUnresolved`] when the path does not
    /// exist as given and no fallback candidate exists either. Paths with
    /// fewer than two components have no fallback candidates.
    pub fn resolve(&self, reported: &Path) -> Result<PathBuf, GenerationError> {
        if reported.exists() {
            return Ok(reported.to_path_buf());
        }

        let candidates: Vec<PathBuf> = match trailing_components(reported) {
            Some((cache_id, file)) => self
                .roots
                .iter()
                .map(|root| root.join(&cache_id).join(&file))
                .collect(),
            None => Vec::new(),
        };

        for candidate in &candidates {
            debug!("Trying fallback location {}", candidate.display());
            if candidate.exists() {
                return Ok(candidate.clone());
            }
        }

        Err(GenerationError::LocationUnresolved {
            reported: reported.to_path_buf(),
            searched: candidates,
        })
    }
}

/// Splits off the last two components, accepting both `/` and `\`.
fn trailing_components(path: &Path) -> Option<(String, String)> {
    let text = path.to_string_lossy();
    let parts: Vec<&str> = text.split(['/', '\\']).filter(|p| !p.is_empty()).collect();

    match parts.as_slice() {
        [.., cache_id, file] => Some(((*cache_id).to_string(), (*file).to_string())),
        _ => None,
    }
}
