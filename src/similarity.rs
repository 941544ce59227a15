use std::collections::BTreeSet;

/// Jaccard threshold above which two titles describe the same topic.
pub const SIMILARITY_THRESHOLD: f64 = 0.4;

/// Tokenize a title for topic comparison: lowercase, delete everything
/// outside ASCII `[a-z0-9]` and whitespace, split, and drop short filler
/// words (length <= 3). Deletion (not space-substitution) keeps
/// "NASA's" as one token `nasas` and "COVID-19" as `covid19`.
pub fn title_tokens(title: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
        .collect();
    for t in cleaned.split_whitespace() {
        if t.len() > 3 {
            out.insert(t.to_string());
        }
    }
    out
}

/// Jaccard similarity |a ∩ b| / |a ∪ b|. Two empty sets have an undefined
/// ratio; treated as 0.0 so degenerate titles never match anything.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    inter as f64 / union as f64
}

pub fn are_similar_topics(title_a: &str, title_b: &str) -> bool {
    jaccard(&title_tokens(title_a), &title_tokens(title_b)) >= SIMILARITY_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_drop_short_and_non_alphanumeric() {
        let tokens = title_tokens("NASA's BIG win: AI & chips, 2026-era!");
        // Punctuation deletes in place: "nasa's" -> "nasas",
        // "2026-era" -> "2026era". "big", "win", "ai" are <= 3 chars.
        let expected: BTreeSet<String> = ["nasas", "chips", "2026era"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn apostrophes_do_not_split_tokens() {
        let tokens = title_tokens("NASA's rover");
        assert!(tokens.contains("nasas"));
        assert!(!tokens.contains("nasa"));
        // "NASA's" and "NASAs" tokenize identically
        assert!(are_similar_topics("NASA's big day", "NASAs big day"));
    }

    #[test]
    fn hyphenated_terms_collapse_to_one_token() {
        let tokens = title_tokens("COVID-19 cases rise");
        assert!(tokens.contains("covid19"));
        assert!(!tokens.contains("covid"));
    }

    #[test]
    fn non_ascii_letters_are_stripped() {
        let accented = title_tokens("café-owner celebrates");
        let plain = title_tokens("cafowner celebrates");
        assert_eq!(accented, plain);
        assert!(accented.contains("cafowner"));
    }

    #[test]
    fn same_story_across_platforms_is_similar() {
        assert!(are_similar_topics(
            "NASA launches new Mars rover mission",
            "Mars rover mission begins NASA launch",
        ));
    }

    #[test]
    fn unrelated_stories_are_not_similar() {
        assert!(!are_similar_topics(
            "NASA launches new Mars rover mission",
            "Local bakery wins award",
        ));
    }

    #[test]
    fn similarity_is_symmetric() {
        let pairs = [
            ("NASA launches new Mars rover mission", "Mars rover mission begins NASA launch"),
            ("NASA launches new Mars rover mission", "Local bakery wins award"),
            ("Election results announced today", "Today election results were announced"),
        ];
        for (a, b) in pairs {
            assert_eq!(are_similar_topics(a, b), are_similar_topics(b, a), "{a} / {b}");
        }
    }

    #[test]
    fn empty_token_sets_are_not_similar() {
        // Every token filtered out on both sides; must not divide by zero.
        assert!(!are_similar_topics("a b. c!", "x, y z"));
        assert!(!are_similar_topics("", ""));
    }

    #[test]
    fn identical_titles_are_similar() {
        assert!(are_similar_topics(
            "Global markets rally after rate decision",
            "Global markets rally after rate decision",
        ));
    }
}
