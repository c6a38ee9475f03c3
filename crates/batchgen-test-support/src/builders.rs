//! Work item builders for testing.

use std::path::Path;

use batchgen_core::{CatalogEntry, ImageInput, ItemSpec, WorkItem};

/// Builder for work items with predictable contents.
pub struct ItemBuilder;

impl ItemBuilder {
    /// Creates a common consumable catalog item.
    #[must_use]
    pub fn catalog(name: &str) -> WorkItem {
        Self::catalog_with(name, "consumable", "Common")
    }

    /// Creates a catalog item with a given kind and rarity.
    #[must_use]
    pub fn catalog_with(name: &str, kind: &str, rarity: &str) -> WorkItem {
        WorkItem::new(
            name,
            ItemSpec::Catalog(CatalogEntry {
                name: name.to_string(),
                description: format!("Description of {name}."),
                kind: kind.to_string(),
                rarity: rarity.to_string(),
                ..CatalogEntry::default()
            }),
        )
    }

    /// Creates one catalog item per name, in order.
    #[must_use]
    pub fn catalog_items(names: &[&str]) -> Vec<WorkItem> {
        names.iter().map(|name| Self::catalog(name)).collect()
    }

    /// Creates a caption-driven item.
    #[must_use]
    pub fn caption(id: &str, text: &str) -> WorkItem {
        WorkItem::new(
            id,
            ItemSpec::Caption {
                text: text.to_string(),
            },
        )
    }

    /// Creates an image-driven item whose id is the file stem.
    #[must_use]
    pub fn image(path: &Path) -> WorkItem {
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        WorkItem::new(id, ItemSpec::Image(ImageInput::new(path)))
    }
}
