//! Keyword-based detectors over free-text session fields.
//!
//! Two pure scanners share the same substring-matching approach:
//!
//! - [`detect_distortions`] tags text against the cognitive-distortion
//!   taxonomy, reporting matches in catalog order.
//! - [`contains_crisis_keyword`] flags self-harm language across one or more
//!   fields; the sticky-dismissal behavior of the resulting banner lives in
//!   the session state, not here.
//!
//! Matching is deliberately naive: raw substring containment, no
//! tokenization, no negation handling. "我不觉得一定要完美" still matches
//! the should-statement keyword "一定要". The tests pin this down as a known
//! false-positive source rather than a behavior to fix.

use crate::catalog::{CRISIS_KEYWORDS, DISTORTIONS};

/// Scan `text` against the distortion catalog.
///
/// Returns the ids of every distortion with at least one keyword substring
/// match, in catalog order. Each id appears at most once regardless of how
/// many of its keywords matched. Empty input yields an empty result.
pub fn detect_distortions(text: &str) -> Vec<&'static str> {
    if text.is_empty() {
        return Vec::new();
    }
    DISTORTIONS
        .iter()
        .filter(|d| d.keywords.iter().any(|k| text.contains(k)))
        .map(|d| d.id)
        .collect()
}

/// Resolve detected distortion ids to their display names, preserving order.
pub fn distortion_names(ids: &[String]) -> Vec<&'static str> {
    ids.iter()
        .filter_map(|id| crate::catalog::distortion_name(id))
        .collect()
}

/// True if any crisis keyword appears as a case-insensitive substring of any
/// of the given fields.
pub fn contains_crisis_keyword<S: AsRef<str>>(fields: &[S]) -> bool {
    fields.iter().any(|field| {
        let lowered = field.as_ref().to_lowercase();
        CRISIS_KEYWORDS.iter().any(|k| lowered.contains(&k.to_lowercase()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_no_tags() {
        assert!(detect_distortions("").is_empty());
    }

    #[test]
    fn test_no_keyword_no_tags() {
        assert!(detect_distortions("今天天气不错，散了散步。").is_empty());
    }

    #[test]
    fn test_single_match() {
        let tags = detect_distortions("这下全完了，项目肯定完蛋。");
        assert_eq!(tags, vec!["catastrophizing"]);
    }

    #[test]
    fn test_multiple_matches_in_catalog_order() {
        // "都怪我" (personalization) appears first in the text, "完了"
        // (catastrophizing) second — the result still follows catalog order.
        let tags = detect_distortions("都怪我，现在全都完了。");
        assert_eq!(tags, vec!["catastrophizing", "personalization"]);
    }

    #[test]
    fn test_duplicate_keywords_suppressed() {
        // Two distinct catastrophizing keywords, one tag.
        let tags = detect_distortions("完了完了，没救了。");
        assert_eq!(tags, vec!["catastrophizing"]);
    }

    #[test]
    fn test_negated_phrase_still_matches() {
        // Known false positive: substring matching has no negation handling,
        // so denying a thought still tags it. Preserved as-is.
        let tags = detect_distortions("我不觉得自己必须做到完美。");
        assert!(tags.contains(&"should-statements"));
    }

    #[test]
    fn test_crisis_keyword_in_any_field() {
        assert!(contains_crisis_keyword(&["今天很累", "有点不想活了"]));
        assert!(!contains_crisis_keyword(&["今天很累", "想早点睡"]));
        assert!(!contains_crisis_keyword::<&str>(&[]));
    }

    #[test]
    fn test_crisis_negation_false_positive() {
        // Same limitation as the distortion detector: "我不是想死" contains
        // "想死" and still flags. Documented, not fixed.
        assert!(contains_crisis_keyword(&["我不是想死，只是很累"]));
    }
}
