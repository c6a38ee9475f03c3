//! Item catalogs written as JavaScript object literals.

use std::path::{Path, PathBuf};

use batchgen_core::{CatalogEntry, ItemSpec, ParseError, WorkItem, WorkSource};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Matches `{ name: '...', description: '...', type: '...', rarity: '...'` in
/// that order, with either quote style.
#[allow(clippy::unwrap_used)]
static ITEM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)\{\s*name:\s*['"](.+?)['"],\s*description:\s*['"](.+?)['"],\s*type:\s*['"](.+?)['"],\s*rarity:\s*['"](.+?)['"]"#,
    )
    .unwrap()
});

/// Reads items from a JS source file such as an item table.
pub struct JsCatalogSource {
    path: PathBuf,
}

impl JsCatalogSource {
    /// Creates a source for the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses catalog entries from JS text, in file order.
    #[must_use]
    pub fn parse(content: &str) -> Vec<WorkItem> {
        ITEM_PATTERN
            .captures_iter(content)
            .map(|caps| {
                let entry = CatalogEntry {
                    name: caps[1].to_string(),
                    description: caps[2].to_string(),
                    kind: caps[3].to_string(),
                    rarity: caps[4].to_string(),
                    ..CatalogEntry::default()
                };
                WorkItem::new(entry.name.clone(), ItemSpec::Catalog(entry))
            })
            .collect()
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkSource for JsCatalogSource {
    fn extract(&self) -> Result<Vec<WorkItem>, ParseError> {
        let content =
            std::fs::read_to_string(self.path()).map_err(|source| ParseError::Unreadable {
                path: self.path.clone(),
                source,
            })?;

        let items = Self::parse(&content);
        debug!("Parsed {} items from {}", items.len(), self.path.display());

        if items.is_empty() {
            return Err(ParseError::Empty {
                path: self.path.clone(),
            });
        }
        Ok(items)
    }

    fn describe(&self) -> String {
        format!("JS catalog {}", self.path.display())
    }
}
