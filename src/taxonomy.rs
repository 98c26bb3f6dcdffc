/// Static genre taxonomy
///
/// The classification wizard walks this mapping: a primary genre, one of its
/// styles, then an optional secondary pair. Embedded at compile time so the
/// wizard's option sets never depend on external files at runtime.
use lazy_static::lazy_static;
use std::collections::BTreeMap;

/// Sentinel a wizard client sends to skip the secondary genre pair
pub const SKIP: &str = "SKIP";

const TAXONOMY_JSON: &str = include_str!("taxonomy.json");

lazy_static! {
    static ref TAXONOMY: BTreeMap<String, Vec<String>> =
        serde_json::from_str(TAXONOMY_JSON).expect("embedded taxonomy is valid JSON");
}

/// All top-level genres, in stable order
pub fn genres() -> Vec<String> {
    TAXONOMY.keys().cloned().collect()
}

/// Styles under one genre, or `None` for an unknown genre
pub fn styles_of(genre: &str) -> Option<&'static Vec<String>> {
    TAXONOMY.get(genre)
}

/// True if `genre` is a known top-level genre
pub fn is_genre(genre: &str) -> bool {
    TAXONOMY.contains_key(genre)
}

/// True if `style` belongs to `genre`
pub fn is_style_of(genre: &str, style: &str) -> bool {
    TAXONOMY
        .get(genre)
        .map(|styles| styles.iter().any(|s| s == style))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_has_genres_and_styles() {
        let genres = genres();
        assert!(!genres.is_empty());
        for genre in &genres {
            let styles = styles_of(genre).unwrap();
            assert!(!styles.is_empty(), "{} has no styles", genre);
        }
    }

    #[test]
    fn style_membership() {
        assert!(is_genre("Rock: Metal & Heavy"));
        assert!(is_style_of("Rock: Metal & Heavy", "Doom"));
        assert!(!is_style_of("Rock: Metal & Heavy", "Deep House"));
        assert!(!is_genre("Polka"));
    }

    #[test]
    fn skip_is_not_a_genre() {
        assert!(!is_genre(SKIP));
    }
}
