use crate::domain::model::{Candidate, Provenance, Suggestion, SuggestionSet};

/// Wraps ranked candidates into a suggestion set, keeping their order.
pub fn assemble(
    candidates: Vec<Candidate>,
    provenance: Provenance,
    service_name: &str,
    max_suggestions: usize,
) -> SuggestionSet {
    let suggestions = candidates
        .into_iter()
        .take(max_suggestions)
        .map(|candidate| {
            let score = candidate.score();
            Suggestion {
                release: candidate.metadata,
                service_name: service_name.to_string(),
                online: true,
                provenance,
                score,
            }
        })
        .collect();
    SuggestionSet { suggestions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ReleaseMetadata;

    #[test]
    fn test_assemble_keeps_order_and_tags() {
        let candidates = vec![
            Candidate::new("2", ReleaseMetadata::default(), 0.9),
            Candidate::new("1", ReleaseMetadata::default(), 0.8),
        ];
        let set = assemble(candidates, Provenance::FuzzyMatch, "discogs", 3);

        assert_eq!(set.len(), 2);
        assert_eq!(set.suggestions[0].score, 0.9);
        assert!(set.iter().all(|s| s.provenance == Provenance::FuzzyMatch));
        assert!(set.iter().all(|s| s.online && s.service_name == "discogs"));
    }

    #[test]
    fn test_assemble_respects_bound() {
        let candidates = (0..5)
            .map(|i| Candidate::new(i.to_string(), ReleaseMetadata::default(), 0.9))
            .collect();
        let set = assemble(candidates, Provenance::FuzzyMatch, "discogs", 3);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_empty_input_gives_empty_set() {
        let set = assemble(Vec::new(), Provenance::FuzzyMatch, "discogs", 3);
        assert!(set.is_empty());
        assert_eq!(serde_json::to_value(&set).unwrap()["suggestions"], serde_json::json!([]));
    }
}
