//! Work source adapters.

mod image_folder;
mod js_catalog;
mod json_catalog;

use std::path::Path;

use batchgen_core::WorkSource;

pub use image_folder::ImageFolderSource;
pub use js_catalog::JsCatalogSource;
pub use json_catalog::JsonCatalogSource;

/// Picks a work source from the shape of `path`.
///
/// Directories are image folders, `.json` files are JSON catalogs and any
/// other file is read as a JS catalog.
#[must_use]
pub fn open_source(path: &Path) -> Box<dyn WorkSource> {
    if path.is_dir() {
        return Box::new(ImageFolderSource::new(path));
    }

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Box::new(JsonCatalogSource::new(path))
    } else {
        Box::new(JsCatalogSource::new(path))
    }
}
