//! Filesystem adapter turning a folder of images into work items.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use batchgen_core::{ImageInput, ItemSpec, MultiView, ParseError, WorkItem, WorkSource};
use tracing::{debug, warn};

/// Supported image extensions.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Stem suffixes marking multi-view companions of a primary image.
const VIEW_SUFFIXES: &[&str] = &["_front", "_back", "_left", "_right"];

/// Folder image source.
///
/// Every supported image directly inside the folder becomes one item, keyed
/// by file stem and ordered by file name. An image named `{stem}_front.png`
/// (likewise `_back`, `_left`, `_right`) is attached to `{stem}` as a view
/// when that primary image exists, and is an item of its own otherwise.
/// When two images share a stem, the first by file name wins.
pub struct ImageFolderSource {
    dir: PathBuf,
}

impl ImageFolderSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Collects supported image files, sorted by name.
    fn collect_files(&self) -> Result<Vec<PathBuf>, ParseError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| ParseError::Unreadable {
            path: self.dir.clone(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_supported_image(path))
            .collect();
        files.sort();
        Ok(files)
    }
}

impl WorkSource for ImageFolderSource {
    fn extract(&self) -> Result<Vec<WorkItem>, ParseError> {
        let files = self.collect_files()?;
        debug!("Found {} image files in {}", files.len(), self.dir.display());

        let primary_stems: HashSet<String> = files
            .iter()
            .map(|path| file_stem(path))
            .filter(|stem| split_view(stem).is_none())
            .collect();

        let mut items: Vec<(String, ImageInput)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut companions = Vec::new();

        for path in files {
            let stem = file_stem(&path);
            if let Some((base, view)) = split_view(&stem) {
                if primary_stems.contains(base) {
                    companions.push((base.to_string(), view, path));
                    continue;
                }
            }
            if positions.contains_key(&stem) {
                warn!(
                    "Ignoring {}: another image already uses the name {stem}",
                    path.display()
                );
                continue;
            }
            positions.insert(stem.clone(), items.len());
            items.push((stem, ImageInput::new(path)));
        }

        for (base, view, path) in companions {
            if let Some(&position) = positions.get(&base) {
                attach_view(&mut items[position].1.views, view, path);
            }
        }

        if items.is_empty() {
            return Err(ParseError::Empty {
                path: self.dir.clone(),
            });
        }

        Ok(items
            .into_iter()
            .map(|(stem, input)| WorkItem::new(stem, ItemSpec::Image(input)))
            .collect())
    }

    fn describe(&self) -> String {
        format!("image folder {}", self.dir.display())
    }
}

/// Checks if a path has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn split_view(stem: &str) -> Option<(&str, &'static str)> {
    VIEW_SUFFIXES.iter().find_map(|suffix| {
        stem.strip_suffix(suffix)
            .filter(|base| !base.is_empty())
            .map(|base| (base, *suffix))
    })
}

fn attach_view(views: &mut MultiView, suffix: &str, path: PathBuf) {
    let slot = match suffix {
        "_front" => &mut views.front,
        "_back" => &mut views.back,
        "_left" => &mut views.left,
        _ => &mut views.right,
    };
    *slot = Some(path);
}
