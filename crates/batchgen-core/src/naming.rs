//! Artifact naming: deterministic, filesystem-safe, collision-free.

use std::path::{Path, PathBuf};

/// Punctuation kept as-is; every other non-alphanumeric character becomes `_`.
const KEPT_PUNCTUATION: &[char] = &['-', '_', '.'];

/// Derives a filesystem-safe base name from an item id.
///
/// Lower-cases the id and replaces, one for one, every character that is not
/// alphanumeric or one of `-_.` with `_`. That covers the characters illegal
/// on common filesystems (`\ / * ? : " < > |`), whitespace and shell-hostile
/// punctuation. The same id always maps to the same name.
#[must_use]
pub fn sanitize_name(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_alphanumeric() || KEPT_PUNCTUATION.contains(&c) {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .to_lowercase()
}

/// Returns `{dir}/{base}{ext}` if it does not exist, otherwise the first
/// free `{dir}/{base}_{n}{ext}` for `n = 1, 2, ...`.
///
/// Not safe against concurrent writers to the same directory.
#[must_use]
pub fn unique_path(dir: &Path, base: &str, extension: &str) -> PathBuf {
    let path = dir.join(format!("{base}{extension}"));
    if !path.exists() {
        return path;
    }

    (1u64..)
        .map(|i| dir.join(format!("{base}_{i}{extension}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(path)
}
