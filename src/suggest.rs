//! Near-duplicate detection for tag names.
//!
//! Given the name an operator is typing and a snapshot of the existing tags,
//! find the tags whose names are a few edits away so the operator can reuse
//! one instead of creating "JavaScrpt" next to "JavaScript".

use serde::Serialize;

use crate::models::Tag;

/// Tunables for [`rank_similar_tags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestOptions {
    /// Upper bound on the number of suggestions returned.
    pub max_results: usize,
    /// Largest edit distance still considered "similar".
    pub max_edit_distance: usize,
    /// Candidates shorter than this (in characters) never match anything.
    pub min_candidate_len: usize,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            max_results: 5,
            max_edit_distance: 3,
            min_candidate_len: 2,
        }
    }
}

impl SuggestOptions {
    /// Overlay caller-supplied limits (query strings, CLI flags) on `self`.
    ///
    /// Negative numbers clamp to zero, which simply produces no suggestions.
    pub fn with_raw(self, max_results: Option<i64>, max_edit_distance: Option<i64>) -> Self {
        let clamp = |v: i64| usize::try_from(v).unwrap_or(0);
        Self {
            max_results: max_results.map(clamp).unwrap_or(self.max_results),
            max_edit_distance: max_edit_distance.map(clamp).unwrap_or(self.max_edit_distance),
            ..self
        }
    }
}

/// An existing tag together with its distance from the candidate.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion<'a> {
    pub tag: &'a Tag,
    pub distance: usize,
}

/// Levenshtein edit distance between `a` and `b`, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());

    // d[i][j]: distance between b[..i] and a[..j]
    let mut d = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        d[0][j] = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            d[i][j] = if b[i - 1] == a[j - 1] {
                d[i - 1][j - 1]
            } else {
                1 + d[i - 1][j - 1].min(d[i][j - 1]).min(d[i - 1][j])
            };
        }
    }

    d[n][m]
}

/// Rank `existing` by similarity to `candidate`, closest first.
///
/// Comparison is case-insensitive. Exact (distance 0) matches are left out,
/// since they are the same tag rather than a suggestion. Ties keep the order
/// of `existing`.
pub fn rank_similar_tags<'a>(
    candidate: &str,
    existing: &'a [Tag],
    options: &SuggestOptions,
) -> Vec<Suggestion<'a>> {
    if candidate.chars().count() < options.min_candidate_len || options.max_results == 0 {
        return Vec::new();
    }

    let needle = candidate.to_lowercase();
    let mut matches: Vec<Suggestion<'a>> = existing
        .iter()
        .filter_map(|tag| {
            let distance = levenshtein(&needle, &tag.name.to_lowercase());
            (distance > 0 && distance <= options.max_edit_distance)
                .then_some(Suggestion { tag, distance })
        })
        .collect();

    // stable: equal distances keep input order
    matches.sort_by_key(|s| s.distance);
    matches.truncate(options.max_results);
    matches
}

/// Same as [`rank_similar_tags`] but returns owned tag records.
pub fn suggest_similar_tags(candidate: &str, existing: &[Tag], options: &SuggestOptions) -> Vec<Tag> {
    rank_similar_tags(candidate, existing, options)
        .into_iter()
        .map(|s| s.tag.clone())
        .collect()
}
