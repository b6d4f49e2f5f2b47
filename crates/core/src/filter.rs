//! Opening-name keyword pre-filter
//!
//! Fuzzy matching between study names and archive opening names, used
//! only to pre-select games worth analyzing. False positives or
//! negatives here affect coverage, never analysis correctness.
//!
//! Matching policy: direct containment either way, otherwise any
//! shared normalized keyword.

const IGNORE_WORDS: &[&str] = &[
    "opening", "defense", "defence", "attack", "game", "variation", "system", "the", "a", "an",
    "for", "by", "in", "on", "white", "black", "both", "old", "new",
];

const MIN_KEYWORD_LEN: usize = 3;

/// Strip a plural "s" from longer words so "Sicilians" matches
/// "Sicilian".
fn normalize_word(word: &str) -> &str {
    if word.len() > 3 && word.ends_with('s') {
        &word[..word.len() - 1]
    } else {
        word
    }
}

fn keywords(text: &str) -> Vec<String> {
    text.split_whitespace()
        .flat_map(|part| part.split('-'))
        .filter(|part| part.len() >= MIN_KEYWORD_LEN && !IGNORE_WORDS.contains(part))
        .map(|part| normalize_word(part).to_string())
        .collect()
}

/// Does one filter string match an opening name?
pub fn filter_matches(filter: &str, opening: &str) -> bool {
    let filter = filter.to_lowercase();
    let opening = opening.to_lowercase();

    if filter.contains(&opening) || opening.contains(&filter) {
        return true;
    }

    let opening_keywords = keywords(&opening);
    keywords(&filter)
        .iter()
        .any(|keyword| opening_keywords.contains(keyword))
}

/// Does any of the filters match? An empty filter list matches
/// everything.
pub fn matches_opening_filters(filters: &[String], opening: &str) -> bool {
    filters.is_empty() || filters.iter().any(|f| filter_matches(f, opening))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_keyword_matches() {
        assert!(filter_matches(
            "Anti-Sicilians For Black",
            "Sicilian Defense Old Sicilian Variation"
        ));
        assert!(filter_matches(
            "Four Knights Sicilian",
            "Sicilian Defense Old Sicilian Variation"
        ));
    }

    #[test]
    fn containment_matches_either_way() {
        assert!(filter_matches("Italian Game", "Italian Game: Giuoco Piano"));
        assert!(filter_matches("Italian Game: Giuoco Piano", "Italian Game"));
    }

    #[test]
    fn stop_words_alone_never_match() {
        // All tokens on both sides are stop words or too short.
        assert!(!filter_matches("Old Defense", "New Attack"));
    }

    #[test]
    fn unrelated_openings_do_not_match() {
        assert!(!filter_matches("Caro-Kann For Black", "King's Indian Defense"));
    }

    #[test]
    fn plural_s_is_singularized() {
        assert!(filter_matches("Najdorfs", "Najdorf Variation"));
        // Short words keep their "s".
        assert!(!filter_matches("gas", "gap"));
    }

    #[test]
    fn case_is_ignored() {
        assert!(filter_matches("CARO-KANN", "caro-kann defense"));
    }

    #[test]
    fn empty_filter_list_matches_everything() {
        assert!(matches_opening_filters(&[], "Anything"));
        assert!(matches_opening_filters(
            &["London System".to_string(), "Italian Game".to_string()],
            "Italian Game: Two Knights"
        ));
        assert!(!matches_opening_filters(
            &["London System".to_string()],
            "Sicilian Najdorf"
        ));
    }
}
