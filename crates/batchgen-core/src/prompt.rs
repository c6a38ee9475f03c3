//! Prompt composition for catalog items.

use crate::domain::CatalogEntry;

const STYLE_GUIDANCE: &str = " Use a vibrant fantasy art style with clear details and a \
transparent background. Make it look professional like items from World of Warcraft or Diablo.";

/// Builds the icon prompt for a catalog entry.
///
/// Rarity is lower-cased; known item kinds add a kind-specific sentence.
#[must_use]
pub fn icon_prompt(entry: &CatalogEntry) -> String {
    let mut prompt = format!(
        "Generate a detailed 2D game icon for a {} {} item called '{}'. {}",
        entry.rarity.to_lowercase(),
        entry.kind,
        entry.name,
        entry.description
    );

    if let Some(hint) = kind_hint(&entry.kind) {
        prompt.push_str(hint);
    }
    prompt.push_str(STYLE_GUIDANCE);

    prompt
}

fn kind_hint(kind: &str) -> Option<&'static str> {
    match kind {
        "consumable" => Some(" The icon should be suitable for a fantasy RPG consumable item."),
        "equipment" => {
            Some(" The icon should look like a high-quality fantasy RPG weapon or equipment.")
        }
        "material" => Some(" The icon should represent a crafting material in a fantasy RPG game."),
        _ => None,
    }
}
