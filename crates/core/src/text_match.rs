//! Best-effort text matching.
//!
//! The assistant's last-resort fallback picks the canned response whose key looks most like
//! the utterance. The scoring lives behind [`TextMatcher`] so a real ranking component can
//! replace it without touching the response generator.

/// A scored candidate returned by a [`TextMatcher`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMatch {
    /// Index into the candidate slice.
    pub index: usize,
    pub score: f64,
}

pub trait TextMatcher: Send + Sync {
    /// Similarity of two strings in `[0, 1]`.
    fn similarity(&self, query: &str, candidate: &str) -> f64;

    /// Highest-scoring candidate; the earliest one wins ties. `None` for an empty slice.
    fn best_match(&self, query: &str, candidates: &[&str]) -> Option<TextMatch> {
        let mut best: Option<TextMatch> = None;
        for (index, candidate) in candidates.iter().enumerate() {
            let score = self.similarity(query, candidate);
            if best.map_or(true, |b| score > b.score) {
                best = Some(TextMatch { index, score });
            }
        }
        best
    }
}

/// Word-overlap ratio over whitespace-split, lower-cased tokens.
///
/// The score is the number of query tokens (duplicates included) that also occur among the
/// candidate tokens, divided by the larger of the two token counts.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenOverlapMatcher;

impl TextMatcher for TokenOverlapMatcher {
    fn similarity(&self, query: &str, candidate: &str) -> f64 {
        let query = query.to_lowercase();
        let candidate = candidate.to_lowercase();
        let left: Vec<&str> = query.split_whitespace().collect();
        let right: Vec<&str> = candidate.split_whitespace().collect();

        let longest = left.len().max(right.len());
        if longest == 0 {
            return 0.0;
        }

        let common = left.iter().filter(|word| right.contains(word)).count();
        common as f64 / longest as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_scores_one() {
        assert_eq!(TokenOverlapMatcher.similarity("bed availability", "Bed Availability"), 1.0);
    }

    #[test]
    fn divides_by_the_longer_side() {
        // "pending" twice in the key, once in the query
        let key = "pending discharges,pending discharge,show pending";
        assert_eq!(TokenOverlapMatcher.similarity("show pending", key), 0.25);
        assert_eq!(TokenOverlapMatcher.similarity("pending pending", "pending"), 1.0);
    }

    #[test]
    fn empty_inputs_score_zero() {
        assert_eq!(TokenOverlapMatcher.similarity("", ""), 0.0);
        assert_eq!(TokenOverlapMatcher.similarity("   ", "room"), 0.0);
    }

    #[test]
    fn best_match_prefers_earliest_on_ties() {
        let candidates = ["alpha beta", "alpha gamma", "delta"];
        let best = TokenOverlapMatcher
            .best_match("alpha", &candidates)
            .expect("non-empty candidates");
        assert_eq!(best.index, 0);
        assert_eq!(best.score, 0.5);
        assert!(TokenOverlapMatcher.best_match("alpha", &[]).is_none());
    }
}
