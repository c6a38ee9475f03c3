//! Work item types produced by a work source.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One unit of requested artifact generation.
///
/// Items are produced once per run by a [`WorkSource`](crate::ports::WorkSource)
/// and never mutated afterwards. The `id` must be stable across runs of the
/// same source so persisted progress stays valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Stable identity (catalog name or image file stem).
    pub id: String,
    /// Generation parameters for this item.
    pub spec: ItemSpec,
}

impl WorkItem {
    /// Creates a new work item.
    #[must_use]
    pub fn new(id: impl Into<String>, spec: ItemSpec) -> Self {
        Self {
            id: id.into(),
            spec,
        }
    }
}

/// What an item asks the generator to produce from.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ItemSpec {
    /// A catalog entry described in words; turned into a text prompt.
    Catalog(CatalogEntry),
    /// A free-form caption used verbatim as the prompt.
    Caption {
        /// Prompt text.
        text: String,
    },
    /// An input image, optionally with multi-view companions.
    Image(ImageInput),
}

/// Catalog entry attributes (name is the item id).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Human-readable item name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Item kind, e.g. `consumable`, `equipment`, `material`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Rarity label, e.g. `Common`, `Rare`.
    pub rarity: String,
    /// Any further attributes carried by the source.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// Image input for image-conditioned generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInput {
    /// Primary image path.
    pub image: PathBuf,
    /// Optional multi-view images.
    #[serde(default)]
    pub views: MultiView,
}

impl ImageInput {
    /// Creates an image input without multi-view companions.
    #[must_use]
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            views: MultiView::default(),
        }
    }
}

/// Multi-view companion images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiView {
    pub front: Option<PathBuf>,
    pub back: Option<PathBuf>,
    pub left: Option<PathBuf>,
    pub right: Option<PathBuf>,
}

impl MultiView {
    /// Returns true when no view is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.front.is_none() && self.back.is_none() && self.left.is_none() && self.right.is_none()
    }
}
