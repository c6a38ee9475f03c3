//! Item catalogs stored as a JSON array of objects.

use std::collections::BTreeMap;
use std::path::PathBuf;

use batchgen_core::{CatalogEntry, ItemSpec, ParseError, WorkItem, WorkSource};
use serde::Deserialize;
use serde_json::Value;

/// One catalog object. Unknown keys are kept as attributes.
#[derive(Debug, Deserialize)]
struct RawEntry {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    rarity: String,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl From<RawEntry> for CatalogEntry {
    fn from(raw: RawEntry) -> Self {
        let attributes = raw
            .extra
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect();

        Self {
            name: raw.name,
            description: raw.description,
            kind: raw.kind,
            rarity: raw.rarity,
            attributes,
        }
    }
}

/// Reads items from a JSON file holding `[{"name": ..., ...}, ...]`.
pub struct JsonCatalogSource {
    path: PathBuf,
}

impl JsonCatalogSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(&self, content: &str) -> Result<Vec<WorkItem>, ParseError> {
        let entries: Vec<RawEntry> =
            serde_json::from_str(content).map_err(|e| ParseError::Malformed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        Ok(entries
            .into_iter()
            .map(|raw| {
                let entry = CatalogEntry::from(raw);
                WorkItem::new(entry.name.clone(), ItemSpec::Catalog(entry))
            })
            .collect())
    }
}

impl WorkSource for JsonCatalogSource {
    fn extract(&self) -> Result<Vec<WorkItem>, ParseError> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|source| ParseError::Unreadable {
                path: self.path.clone(),
                source,
            })?;

        let items = self.parse(&content)?;
        if items.is_empty() {
            return Err(ParseError::Empty {
                path: self.path.clone(),
            });
        }
        Ok(items)
    }

    fn describe(&self) -> String {
        format!("JSON catalog {}", self.path.display())
    }
}
