use crate::domain::model::Candidate;
use std::cmp::Ordering;

/// Drops candidates at or below `threshold`.
pub fn above_threshold(candidates: Vec<Candidate>, threshold: f64) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| c.score() > threshold)
        .collect()
}

/// Sorts by descending score and keeps the first `bound` entries.
///
/// The sort is stable, so equal scores keep their incoming order.
pub fn best_n(mut candidates: Vec<Candidate>, bound: usize) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal));
    candidates.truncate(bound);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ReleaseMetadata;

    fn candidate(id: &str, score: f64) -> Candidate {
        Candidate::new(id, ReleaseMetadata::default(), score)
    }

    fn ids(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_best_n_sorts_and_truncates() {
        let input = vec![
            candidate("a", 0.6),
            candidate("b", 0.9),
            candidate("c", 0.7),
            candidate("d", 0.8),
        ];
        let best = best_n(input, 3);
        assert_eq!(ids(&best), vec!["b", "d", "c"]);
    }

    #[test]
    fn test_ties_keep_incoming_order() {
        let input = vec![
            candidate("first", 0.8),
            candidate("second", 0.9),
            candidate("third", 0.8),
            candidate("fourth", 0.8),
        ];
        let best = best_n(input, 3);
        assert_eq!(ids(&best), vec!["second", "first", "third"]);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let input = vec![candidate("at", 0.5), candidate("above", 0.51), candidate("below", 0.1)];
        let kept = above_threshold(input, 0.5);
        assert_eq!(ids(&kept), vec!["above"]);
    }

    #[test]
    fn test_bound_larger_than_input() {
        let best = best_n(vec![candidate("only", 0.9)], 7);
        assert_eq!(best.len(), 1);
        assert!(best_n(Vec::new(), 3).is_empty());
    }
}
