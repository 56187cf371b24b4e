//! Fuzzy search over the flattened registry.
//!
//! A field matches a query when some substring of it is within a bounded
//! edit distance of the query. The score is that distance divided by the
//! query length, so `0.0` is an exact (case-insensitive) hit and the
//! default threshold admits roughly one edit per three query characters.

use serde::Serialize;

use crate::model::{FlatRecord, Registry};

/// Default maximum score for a match.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Approximate substring matcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl FuzzyMatcher {
    /// Create a matcher; the threshold is clamped to `0.0..=1.0`.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Score `text` against `query`, or `None` if it does not match.
    pub fn score(&self, query: &str, text: &str) -> Option<f64> {
        let pattern: Vec<char> = query.trim().to_lowercase().chars().collect();
        self.score_pattern(&pattern, text)
    }

    fn score_pattern(&self, pattern: &[char], text: &str) -> Option<f64> {
        if pattern.is_empty() {
            return Some(0.0);
        }

        let text: Vec<char> = text.to_lowercase().chars().collect();
        let distance = substring_distance(pattern, &text);
        let score = distance as f64 / pattern.len() as f64;

        (score <= self.threshold).then_some(score)
    }

    /// Best score across a record's searchable fields.
    fn score_record(&self, pattern: &[char], record: &FlatRecord) -> Option<f64> {
        record
            .searchable_fields()
            .filter_map(|field| self.score_pattern(pattern, field))
            .min_by(|a, b| a.total_cmp(b))
    }
}

/// Smallest edit distance between `pattern` and any substring of `text`.
fn substring_distance(pattern: &[char], text: &[char]) -> usize {
    let m = pattern.len();

    // prev[i]: distance of pattern[..i] against the best substring ending
    // at the previous text position. Row 0 is free so a match may start
    // anywhere.
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0; m + 1];
    let mut best = m;

    for &c in text {
        for i in 1..=m {
            let substitute = prev[i - 1] + usize::from(pattern[i - 1] != c);
            curr[i] = substitute.min(prev[i] + 1).min(curr[i - 1] + 1);
        }
        best = best.min(curr[m]);
        if best == 0 {
            break;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}

/// A matched record with its score (lower is better).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub record: FlatRecord,
    pub score: f64,
}

/// Search index over one registry snapshot. Cheap to rebuild.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    records: Vec<FlatRecord>,
    matcher: FuzzyMatcher,
}

impl SearchIndex {
    /// Flatten a registry into a fresh index.
    pub fn build(registry: &Registry) -> Self {
        Self {
            records: registry.flatten(),
            matcher: FuzzyMatcher::default(),
        }
    }

    /// Use a different matcher.
    pub fn with_matcher(mut self, matcher: FuzzyMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Ranked matches for `query`.
    ///
    /// A blank query returns every record in registry order with score 0.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let pattern: Vec<char> = query.trim().to_lowercase().chars().collect();

        if pattern.is_empty() {
            return self
                .records
                .iter()
                .cloned()
                .map(|record| SearchHit { record, score: 0.0 })
                .collect();
        }

        let mut hits: Vec<SearchHit> = self
            .records
            .iter()
            .filter_map(|record| {
                self.matcher
                    .score_record(&pattern, record)
                    .map(|score| SearchHit {
                        record: record.clone(),
                        score,
                    })
            })
            .collect();

        // Stable: equal scores stay in registry order.
        hits.sort_by(|a, b| a.score.total_cmp(&b.score));

        tracing::debug!("Search {:?} matched {} records", query, hits.len());

        hits
    }
}

/// Build an index for `registry` and run one query against it.
pub fn search(registry: &Registry, query: &str) -> Vec<FlatRecord> {
    SearchIndex::build(registry)
        .search(query)
        .into_iter()
        .map(|hit| hit.record)
        .collect()
}
