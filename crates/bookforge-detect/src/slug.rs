use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Maximum slug length in characters.
const MAX_LEN: usize = 60;

/// Turns a chapter title into a filesystem-safe filename fragment.
///
/// Whitespace runs collapse to a single space, non-alphanumeric runs
/// collapse to a single `-`, leading/trailing separators are trimmed and
/// the result is truncated to 60 characters. An empty result falls back to
/// the given placeholder.
pub fn slugify(title: &str, fallback: &str) -> String {
    let collapsed = WHITESPACE.replace_all(title.trim(), " ");
    let dashed = NON_ALNUM.replace_all(&collapsed, "-");
    let trimmed = dashed.trim_matches('-');
    let slug: String = trimmed.chars().take(MAX_LEN).collect();
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_basic() {
        assert_eq!(slugify("The Real Numbers", "Chapter"), "The-Real-Numbers");
    }

    #[test]
    fn test_slug_collapses_punctuation_runs() {
        assert_eq!(
            slugify("Chapter 3: Limits, Continuity & Derivatives", "Chapter"),
            "Chapter-3-Limits-Continuity-Derivatives"
        );
    }

    #[test]
    fn test_slug_trims_separators() {
        assert_eq!(slugify("  ...Integrals!  ", "Chapter"), "Integrals");
    }

    #[test]
    fn test_slug_truncates() {
        let long = "x".repeat(200);
        assert_eq!(slugify(&long, "Chapter").len(), 60);
    }

    #[test]
    fn test_slug_empty_falls_back() {
        assert_eq!(slugify("", "Exercises"), "Exercises");
        assert_eq!(slugify("£€¥", "Chapter"), "Chapter");
    }
}
