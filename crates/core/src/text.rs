//! Accent- and case-insensitive text helpers.
//!
//! Item and list names are typed by hand in Portuguese, so "Açúcar",
//! "acucar" and " AÇUCAR " must all be treated as the same name.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fold a string for comparison: strip diacritics, lowercase, collapse whitespace.
///
/// ```
/// use pantry_core::text::fold;
///
/// assert_eq!(fold("  Feijão   Preto "), "feijao preto");
/// ```
#[must_use]
pub fn fold(input: &str) -> String {
    let stripped: String = input.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns `true` if two names are equal after folding.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}

/// Returns `true` if `needle` occurs in `haystack` after folding both.
///
/// An empty needle matches everything.
#[must_use]
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    let needle = fold(needle);
    needle.is_empty() || fold(haystack).contains(&needle)
}

/// Locale-style ordering: compare folded forms, then raw text to keep it total.
#[must_use]
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_accents_and_case() {
        assert_eq!(fold("Açúcar"), "acucar");
        assert_eq!(fold("ÓLEO de SOJA"), "oleo de soja");
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("Arroz", "arroz"));
        assert!(names_match("Feijão  carioca", "feijao carioca"));
        assert!(!names_match("Arroz", "Arroz integral"));
    }

    #[test]
    fn test_contains_folded() {
        assert!(contains_folded("Lista da Cozinha", "cozinha"));
        assert!(contains_folded("Pão francês", "frances"));
        assert!(contains_folded("anything", "   "));
        assert!(!contains_folded("Bar", "cozinha"));
    }

    #[test]
    fn test_locale_cmp_ignores_accents() {
        let mut names = vec!["Óleo", "arroz", "Banana", "açúcar"];
        names.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(names, vec!["açúcar", "arroz", "Banana", "Óleo"]);
    }
}
