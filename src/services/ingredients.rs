use std::collections::HashSet;
use std::sync::OnceLock;

use crate::models::LabelAnnotation;

#[rustfmt::skip]
const VALID_INGREDIENTS: &[&str] = &[
    // produce
    "apple", "banana", "orange", "strawberry", "blueberry", "grape",
    "tomato", "cucumber", "lettuce", "carrot", "onion", "garlic",
    "pepper", "potato", "broccoli", "spinach", "mushroom",
    // proteins
    "chicken", "beef", "pork", "salmon", "fish", "egg", "turkey",
    // dairy & bakery
    "bread", "cheese", "milk", "butter", "yogurt",
    // staples
    "rice", "pasta",
];

fn allow_list() -> &'static HashSet<&'static str> {
    static ALLOW_LIST: OnceLock<HashSet<&'static str>> = OnceLock::new();
    ALLOW_LIST.get_or_init(|| VALID_INGREDIENTS.iter().copied().collect())
}

/// Returns true if the (already lowercased) name is a recognized ingredient
pub fn is_known_ingredient(name: &str) -> bool {
    allow_list().contains(name)
}

/// Pick the best ingredient from Vision labels.
///
/// The first label (in API order) whose lowercased description is on the
/// allow-list wins and is capitalized. When nothing matches, the top label is
/// returned as-is. No labels at all gives `None`.
pub fn extract_ingredient(labels: &[LabelAnnotation]) -> Option<String> {
    let first = labels.first()?;

    for label in labels {
        let name = label.description.to_lowercase();
        if is_known_ingredient(&name) {
            return Some(capitalize(&name));
        }
    }

    log::debug!("🔎 No allow-list match, falling back to top label: {}", first.description);
    Some(first.description.clone())
}

/// Uppercase the first character and lowercase the rest
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
